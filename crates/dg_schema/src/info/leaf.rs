use crate::info::{Type, TypePath};

/// Schema of a leaf or string type.
#[derive(Debug, Clone)]
pub struct LeafInfo {
    ty: Type,
}

impl LeafInfo {
    #[inline]
    pub fn new<T: TypePath + ?Sized>() -> Self {
        Self { ty: Type::of::<T>() }
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }
}
