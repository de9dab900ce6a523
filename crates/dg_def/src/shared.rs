use alloc::rc::Rc;
use core::any::{Any, TypeId};
use core::cell::RefCell;

/// A reference-identity object of the graph.
///
/// Cloning the handle shares the object; writing a graph keeps aliasing
/// between handles.
pub type Shared<T> = Rc<RefCell<T>>;

/// A [`Shared`] handle with its type erased, as stored by the registries.
///
/// Always holds an `Rc<RefCell<T>>`, downcast with
/// `handle.downcast_ref::<RefCell<T>>()` or `Rc::downcast`.
pub type ErasedShared = Rc<dyn Any>;

/// Marker for types stored in the [`Database`](crate::Database).
///
/// Derived types share the database scope of their root so that a name is
/// unique across a whole hierarchy.
pub trait Def: Any {
    /// The scope this def is registered under.
    fn def_root() -> TypeId;
}

/// Erases a typed handle without changing its identity.
#[inline]
pub fn erase<T: Any>(shared: &Shared<T>) -> ErasedShared {
    shared.clone()
}

/// Address identifying the object behind a handle, typed or erased.
#[inline]
pub fn ptr_key<T: ?Sized>(handle: &Rc<T>) -> usize {
    Rc::as_ptr(handle).cast::<()>() as usize
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::{erase, ptr_key};

    #[test]
    fn erased_handle_keeps_identity() {
        let typed = Rc::new(RefCell::new(5_i32));
        let erased = erase(&typed);
        assert_eq!(ptr_key(&typed), ptr_key(&erased));
        assert_eq!(Rc::strong_count(&typed), 2);
        let back = erased.downcast_ref::<RefCell<i32>>().unwrap();
        assert_eq!(*back.borrow(), 5);
    }
}
