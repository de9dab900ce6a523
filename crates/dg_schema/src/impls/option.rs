use crate::cell::{GenericSchemaCell, GenericTypePathCell};
use crate::info::{OptionalInfo, SchemaNode, TypePath, Typed};
use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry};

impl<T: TypePath> TypePath for Option<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| crate::concat(&["core::option::Option<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| crate::concat(&["Option<", T::type_name(), ">"]))
    }
}

impl<T: Typed> Typed for Option<T> {
    fn schema() -> &'static SchemaNode {
        static CELL: GenericSchemaCell = GenericSchemaCell::new();
        CELL.get_or_insert::<Self>(|| SchemaNode::Optional(OptionalInfo::new::<Self, T>()))
    }
}

impl<T: GetTypeMeta> GetTypeMeta for Option<T> {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}
