use core::any::TypeId;

use crate::info::{CompositeInfo, SchemaNode, Type, TypePath, Typed};

/// Schema of a shared handle.
///
/// Whether the handle is an entity reference depends on the target, which is
/// only inspected on demand. This keeps schema construction free of
/// recursion for self-referencing types.
#[derive(Debug, Clone)]
pub struct ReferenceInfo {
    ty: Type,
    target_id: TypeId,
    target: fn() -> &'static SchemaNode,
}

impl ReferenceInfo {
    #[inline]
    pub fn new<T: TypePath + ?Sized, Target: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            target_id: TypeId::of::<Target>(),
            target: Target::schema,
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn target_id(&self) -> TypeId {
        self.target_id
    }

    #[inline]
    pub fn target(&self) -> &'static SchemaNode {
        (self.target)()
    }

    /// `true` if the target is a def type.
    pub fn is_entity(&self) -> bool {
        self.target()
            .as_composite()
            .is_ok_and(CompositeInfo::is_def)
    }
}
