//! Items used by code generated in `dg_record_derive`. Not public API.

pub use alloc::boxed::Box;
pub use alloc::string::String;
pub use core::any::TypeId;

pub mod auto_register {
    use crate::registry::TypeRegistry;

    #[cfg(feature = "auto_register")]
    pub use inventory;

    /// Registration hook submitted by derived types.
    #[cfg(feature = "auto_register")]
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    #[cfg(feature = "auto_register")]
    inventory::collect!(__AutoRegisterFunc);

    /// Registered through `inventory` itself; its presence after collection
    /// proves the platform supports static registration.
    #[cfg(feature = "auto_register")]
    pub struct __AvailFlag;

    #[cfg(feature = "auto_register")]
    impl crate::TypePath for __AvailFlag {
        fn type_path() -> &'static str {
            "dg_schema::__macro_exports::auto_register::__AvailFlag"
        }

        fn type_name() -> &'static str {
            "__AvailFlag"
        }
    }

    #[cfg(feature = "auto_register")]
    impl crate::Typed for __AvailFlag {
        fn schema() -> &'static crate::SchemaNode {
            static CELL: crate::cell::NonGenericSchemaCell = crate::cell::NonGenericSchemaCell::new();
            CELL.get_or_init(|| crate::SchemaNode::Leaf(crate::info::LeafInfo::new::<Self>()))
        }
    }

    #[cfg(feature = "auto_register")]
    impl crate::registry::GetTypeMeta for __AvailFlag {
        fn get_type_meta() -> crate::registry::TypeMeta {
            crate::registry::TypeMeta::of::<Self>()
        }
    }

    #[cfg(feature = "auto_register")]
    fn register_avail_flag(registry: &mut TypeRegistry) {
        registry.register::<__AvailFlag>();
    }

    #[cfg(feature = "auto_register")]
    inventory::submit! {
        __AutoRegisterFunc(register_avail_flag)
    }

    /// Implemented for every registrable type, used by generated submissions.
    pub trait __RegisterType {
        fn __register(registry: &mut TypeRegistry);
    }

    impl<T: crate::registry::GetTypeMeta> __RegisterType for T {
        #[inline]
        fn __register(registry: &mut TypeRegistry) {
            registry.register::<T>();
        }
    }

    #[cfg(feature = "auto_register")]
    pub(crate) fn register_submitted(registry: &mut TypeRegistry) -> bool {
        use core::any::TypeId;

        if registry.contains(TypeId::of::<__AvailFlag>()) {
            return true;
        }
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
        registry.contains(TypeId::of::<__AvailFlag>())
    }

    #[cfg(not(feature = "auto_register"))]
    pub(crate) fn register_submitted(_registry: &mut TypeRegistry) -> bool {
        false
    }
}
