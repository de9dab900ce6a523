use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::fmt;

use dg_utils::TypeIdMap;
use dg_utils::hash::HashSet;

use crate::{ErasedShared, Shared, ptr_key};

/// Dense per-type instance numbering.
///
/// Each indexed type owns a table; an instance receives the next free slot
/// the first time it is assigned. Indices are never reused: a deleted entity
/// keeps its slot.
///
/// Tables hold the handle as it was assigned: a derived instance stored in a
/// base table is found with [`get_erased`](Self::get_erased).
#[derive(Default)]
pub struct IndexRegistry {
    tables: TypeIdMap<Vec<Option<ErasedShared>>>,
    assigned: HashSet<(TypeId, usize)>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next index of table `table` to `handle`.
    ///
    /// Returns `None` if this handle was already assigned in that table.
    pub fn assign_erased(&mut self, table: TypeId, handle: &ErasedShared) -> Option<usize> {
        if !self.assigned.insert((table, ptr_key(handle))) {
            return None;
        }
        let slots = self.tables.get_or_insert(table, Vec::new);
        slots.push(Some(handle.clone()));
        Some(slots.len() - 1)
    }

    #[inline]
    pub fn assign<T: Any>(&mut self, handle: &Shared<T>) -> Option<usize> {
        let erased: ErasedShared = handle.clone();
        self.assign_erased(TypeId::of::<T>(), &erased)
    }

    /// Takes the next index of `table` without an instance.
    ///
    /// Used for value types, whose snapshot is [`fill`](Self::fill)ed later.
    pub fn reserve_erased(&mut self, table: TypeId) -> usize {
        let slots = self.tables.get_or_insert(table, Vec::new);
        slots.push(None);
        slots.len() - 1
    }

    #[inline]
    pub fn reserve<T: Any>(&mut self) -> usize {
        self.reserve_erased(TypeId::of::<T>())
    }

    /// Stores `handle` at a previously reserved `index`.
    ///
    /// Returns `false` if `index` was never handed out.
    pub fn fill_erased(&mut self, table: TypeId, index: usize, handle: ErasedShared) -> bool {
        match self.tables.get_mut(&table).and_then(|slots| slots.get_mut(index)) {
            Some(slot) => {
                *slot = Some(handle);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn fill<T: Any>(&mut self, index: usize, value: T) -> bool {
        self.fill_erased(TypeId::of::<T>(), index, Rc::new(RefCell::new(value)))
    }

    pub fn get_erased_by_id(&self, table: TypeId, index: usize) -> Option<ErasedShared> {
        self.tables.get(&table)?.get(index)?.clone()
    }

    /// The handle stored at `index` of the table of `T`, of any concrete type.
    #[inline]
    pub fn get_erased<T: Any>(&self, index: usize) -> Option<ErasedShared> {
        self.get_erased_by_id(TypeId::of::<T>(), index)
    }

    /// The instance at `index`, if it is exactly a `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<Shared<T>> {
        Rc::downcast::<RefCell<T>>(self.get_erased::<T>(index)?).ok()
    }

    /// Number of indices handed out for `table`.
    pub fn count_by_id(&self, table: TypeId) -> usize {
        self.tables.get(&table).map_or(0, Vec::len)
    }

    #[inline]
    pub fn count<T: Any>(&self) -> usize {
        self.count_by_id(TypeId::of::<T>())
    }

    /// `true` if `handle` already holds an index in `table`.
    pub fn is_assigned<T: ?Sized>(&self, table: TypeId, handle: &Rc<T>) -> bool {
        self.assigned.contains(&(table, ptr_key(handle)))
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.assigned.clear();
    }
}

impl fmt::Debug for IndexRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.tables.iter().map(|(id, slots)| (id, slots.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::any::TypeId;
    use core::cell::RefCell;

    use super::IndexRegistry;
    use crate::ErasedShared;

    struct Unit(u32);
    struct Derived;

    #[test]
    fn dense_from_zero() {
        let mut indices = IndexRegistry::new();
        let handles: [_; 3] = core::array::from_fn(|i| Rc::new(RefCell::new(Unit(i as u32))));

        for (expected, handle) in handles.iter().enumerate() {
            assert_eq!(indices.assign(handle), Some(expected));
        }
        assert_eq!(indices.count::<Unit>(), 3);
        assert_eq!(indices.get::<Unit>(1).unwrap().borrow().0, 1);
        assert!(indices.get::<Unit>(3).is_none());
    }

    #[test]
    fn at_most_once() {
        let mut indices = IndexRegistry::new();
        let handle = Rc::new(RefCell::new(Unit(0)));
        assert_eq!(indices.assign(&handle), Some(0));
        assert_eq!(indices.assign(&handle), None);
        assert_eq!(indices.count::<Unit>(), 1);
    }

    #[test]
    fn base_table_holds_derived() {
        let mut indices = IndexRegistry::new();
        let base = TypeId::of::<Unit>();
        indices.assign(&Rc::new(RefCell::new(Unit(0))));

        let derived: ErasedShared = Rc::new(RefCell::new(Derived));
        assert_eq!(indices.assign_erased(TypeId::of::<Derived>(), &derived), Some(0));
        assert_eq!(indices.assign_erased(base, &derived), Some(1));
        assert!(indices.is_assigned(base, &derived));

        assert!(indices.get::<Unit>(1).is_none());
        let stored = indices.get_erased::<Unit>(1).unwrap();
        assert!(Rc::ptr_eq(&stored, &derived));
    }

    #[test]
    fn reserve_and_fill() {
        let mut indices = IndexRegistry::new();
        let first = indices.reserve::<u32>();
        let second = indices.reserve::<u32>();
        assert_eq!((first, second), (0, 1));
        assert!(indices.get::<u32>(first).is_none());

        assert!(indices.fill(second, 42_u32));
        assert!(!indices.fill(7, 1_u32));
        assert_eq!(*indices.get::<u32>(second).unwrap().borrow(), 42);
    }

    #[test]
    fn clear_resets_tables() {
        let mut indices = IndexRegistry::new();
        let handle = Rc::new(RefCell::new(Unit(0)));
        indices.assign(&handle);
        indices.clear();
        assert_eq!(indices.count::<Unit>(), 0);
        assert_eq!(indices.assign(&handle), Some(0));
    }
}
