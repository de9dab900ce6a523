use core::any::Any;

/// A capability stored in a [`TypeMeta`](crate::registry::TypeMeta).
///
/// Implemented for every `Send + Sync + 'static` type.
pub trait TypeTrait: Any + Send + Sync {}

impl<T: Any + Send + Sync> TypeTrait for T {}

impl dyn TypeTrait {
    #[inline]
    pub fn is<T: TypeTrait>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: TypeTrait>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: TypeTrait>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}
