use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;
use core::ops::Deref;

use dg_utils::TypeIdMap;

use crate::info::{SchemaNode, Type, Typed};
use crate::registry::{TypeRegistry, TypeTrait};

// -----------------------------------------------------------------------------
// TypeMeta

/// Registry entry of one type: its schema and its capability table.
pub struct TypeMeta {
    ty: Type,
    schema: &'static SchemaNode,
    trait_table: TypeIdMap<Box<dyn TypeTrait>>,
}

impl TypeMeta {
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self::with_capacity::<T>(0)
    }

    #[inline]
    pub fn with_capacity<T: Typed>(capacity: usize) -> Self {
        Self {
            ty: Type::of::<T>(),
            schema: T::schema(),
            trait_table: TypeIdMap::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline(always)]
    pub const fn schema(&self) -> &'static SchemaNode {
        self.schema
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty.id()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    #[inline(always)]
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.insert_trait_by_id(TypeId::of::<T>(), Box::new(data));
    }

    #[inline(never)]
    fn insert_trait_by_id(&mut self, id: TypeId, val: Box<dyn TypeTrait>) {
        self.trait_table.insert(id, val);
    }

    #[inline]
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.get_trait_by_id(TypeId::of::<T>())
            .and_then(<dyn TypeTrait>::downcast_ref)
    }

    pub fn get_trait_by_id(&self, type_id: TypeId) -> Option<&dyn TypeTrait> {
        self.trait_table.get(&type_id).map(Deref::deref)
    }

    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains(&TypeId::of::<T>())
    }

    #[inline]
    pub fn trait_len(&self) -> usize {
        self.trait_table.len()
    }
}

impl fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMeta")
            .field("ty", &self.ty)
            .field("kind", &self.schema.kind())
            .field("traits", &self.trait_table.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// Types that can be added to a [`TypeRegistry`].
///
/// # Examples
///
/// ```
/// use dg_schema::registry::{GetTypeMeta, TypeRegistry};
///
/// let mut registry = TypeRegistry::empty();
/// registry.register::<Vec<Option<u16>>>();
///
/// // Dependencies are registered along the way.
/// assert!(registry.get_with_type_name("Option<u16>").is_some());
/// assert!(registry.get_with_type_name("u16").is_some());
/// ```
pub trait GetTypeMeta: Typed {
    fn get_type_meta() -> TypeMeta;

    /// Registers the types this type is built from.
    #[inline(always)]
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
