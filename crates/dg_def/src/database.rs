use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::fmt;

use dg_utils::TypeIdMap;
use dg_utils::hash::HashMap;

use crate::{Def, DatabaseError, ErasedShared, Shared, is_valid_def_name, ptr_key};

// -----------------------------------------------------------------------------
// DefEntry

/// A registered def.
pub struct DefEntry {
    name: String,
    root: TypeId,
    ty: TypeId,
    handle: ErasedShared,
}

impl DefEntry {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Database scope the def was registered under.
    #[inline]
    pub fn root(&self) -> TypeId {
        self.root
    }

    /// Concrete type of the def.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    #[inline]
    pub fn handle(&self) -> &ErasedShared {
        &self.handle
    }

    /// Returns the typed handle if the def is exactly a `T`.
    pub fn downcast<T: Any>(&self) -> Option<Shared<T>> {
        Rc::downcast::<RefCell<T>>(self.handle.clone()).ok()
    }
}

impl fmt::Debug for DefEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefEntry")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Database

/// Named singleton entities, one name scope per def root type.
///
/// Entries keep their creation order; deleting leaves a hole that
/// [`iter`](Self::iter) skips.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use dg_def::{Database, Def};
///
/// #[derive(Default)]
/// struct Item { value: i32 }
///
/// impl Def for Item {
///     fn def_root() -> TypeId { TypeId::of::<Item>() }
/// }
///
/// let mut db = Database::new();
/// let sword = db.create::<Item>("Sword").unwrap();
/// sword.borrow_mut().value = 7;
///
/// let found = db.get::<Item>("Sword").unwrap();
/// assert_eq!(found.borrow().value, 7);
/// assert_eq!(db.name_of(&found), Some("Sword"));
/// ```
#[derive(Default)]
pub struct Database {
    slots: Vec<Option<DefEntry>>,
    scopes: TypeIdMap<HashMap<String, usize>>,
    by_ptr: HashMap<usize, usize>,
    live: usize,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an already constructed handle under `name`.
    ///
    /// `root` is the scope, `ty` the concrete type of the handle.
    pub fn insert_erased(
        &mut self,
        root: TypeId,
        ty: TypeId,
        name: &str,
        handle: ErasedShared,
    ) -> Result<(), DatabaseError> {
        if !is_valid_def_name(name) {
            return Err(DatabaseError::InvalidName(name.to_string()));
        }

        let scope = self.scopes.get_or_insert(root, HashMap::default);
        if scope.contains_key(name) {
            return Err(DatabaseError::Duplicate(name.to_string()));
        }

        let slot = self.slots.len();
        scope.insert(name.to_string(), slot);
        self.by_ptr.insert(ptr_key(&handle), slot);
        self.slots.push(Some(DefEntry {
            name: name.to_string(),
            root,
            ty,
            handle,
        }));
        self.live += 1;

        log::trace!("registered def `{name}`");
        Ok(())
    }

    /// Registers `handle` under `name` in the scope of `T`.
    pub fn insert<T: Def>(&mut self, name: &str, handle: Shared<T>) -> Result<(), DatabaseError> {
        self.insert_erased(T::def_root(), TypeId::of::<T>(), name, handle)
    }

    /// Creates a default `T` and registers it under `name`.
    pub fn create<T: Def + Default>(&mut self, name: &str) -> Result<Shared<T>, DatabaseError> {
        let handle = Rc::new(RefCell::new(T::default()));
        self.insert(name, handle.clone())?;
        Ok(handle)
    }

    /// Looks up a def of exactly type `T` in the scope of `T`.
    ///
    /// A def of a derived type is found through [`get_erased`](Self::get_erased).
    pub fn get<T: Def>(&self, name: &str) -> Option<Shared<T>> {
        self.get_erased(T::def_root(), name)?.downcast::<T>()
    }

    /// Looks up a def of any type in the scope `root`.
    pub fn get_erased(&self, root: TypeId, name: &str) -> Option<&DefEntry> {
        let slot = *self.scopes.get(&root)?.get(name)?;
        self.slots.get(slot)?.as_ref()
    }

    /// Name of the def behind `handle`, if it is registered.
    pub fn name_of<T: ?Sized>(&self, handle: &Rc<T>) -> Option<&str> {
        self.entry_of(handle).map(DefEntry::name)
    }

    pub fn entry_of<T: ?Sized>(&self, handle: &Rc<T>) -> Option<&DefEntry> {
        let slot = *self.by_ptr.get(&ptr_key(handle))?;
        self.slots.get(slot)?.as_ref()
    }

    #[inline]
    pub fn contains<T: ?Sized>(&self, handle: &Rc<T>) -> bool {
        self.by_ptr.contains_key(&ptr_key(handle))
    }

    /// Removes the def behind `handle`.
    ///
    /// The removed entry is returned; its name becomes available again.
    pub fn delete<T: ?Sized>(&mut self, handle: &Rc<T>) -> Result<DefEntry, DatabaseError> {
        let slot = self
            .by_ptr
            .remove(&ptr_key(handle))
            .ok_or(DatabaseError::NotRegistered)?;
        let entry = self
            .slots
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or(DatabaseError::NotRegistered)?;

        if let Some(scope) = self.scopes.get_mut(&entry.root) {
            scope.remove(&entry.name);
        }
        self.live -= 1;

        log::trace!("deleted def `{}`", entry.name);
        Ok(entry)
    }

    /// Gives the def behind `handle` a new name in the same scope.
    ///
    /// Renaming to the current name is a no-op.
    pub fn rename<T: ?Sized>(&mut self, handle: &Rc<T>, name: &str) -> Result<(), DatabaseError> {
        let slot = *self
            .by_ptr
            .get(&ptr_key(handle))
            .ok_or(DatabaseError::NotRegistered)?;
        if !is_valid_def_name(name) {
            return Err(DatabaseError::InvalidName(name.to_string()));
        }

        let entry = self
            .slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(DatabaseError::NotRegistered)?;
        if entry.name == name {
            return Ok(());
        }

        let scope = self.scopes.get_or_insert(entry.root, HashMap::default);
        if scope.contains_key(name) {
            return Err(DatabaseError::Duplicate(name.to_string()));
        }
        scope.remove(&entry.name);
        scope.insert(name.to_string(), slot);

        log::trace!("renamed def `{}` to `{name}`", entry.name);
        entry.name = name.to_string();
        Ok(())
    }

    /// Every live def in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &DefEntry> {
        self.slots.iter().flatten()
    }

    /// Every live def whose concrete type is `T`.
    pub fn iter_type<T: Any>(&self) -> impl Iterator<Item = (&str, Shared<T>)> {
        self.iter()
            .filter_map(|entry| Some((entry.name(), entry.downcast::<T>()?)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.scopes.clear();
        self.by_ptr.clear();
        self.live = 0;
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::any::TypeId;
    use core::cell::RefCell;

    use crate::{Database, DatabaseError, Def};

    #[derive(Default)]
    struct Weapon {
        damage: i32,
    }

    impl Def for Weapon {
        fn def_root() -> TypeId {
            TypeId::of::<Weapon>()
        }
    }

    #[derive(Default)]
    struct Bow {
        range: i32,
    }

    impl Def for Bow {
        fn def_root() -> TypeId {
            TypeId::of::<Weapon>()
        }
    }

    #[derive(Default)]
    struct Armor;

    impl Def for Armor {
        fn def_root() -> TypeId {
            TypeId::of::<Armor>()
        }
    }

    #[test]
    fn create_and_get() {
        let mut db = Database::new();
        let sword = db.create::<Weapon>("Sword").unwrap();
        sword.borrow_mut().damage = 12;

        let found = db.get::<Weapon>("Sword").unwrap();
        assert!(Rc::ptr_eq(&sword, &found));
        assert_eq!(found.borrow().damage, 12);
        assert!(db.get::<Weapon>("Axe").is_none());
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn invalid_names() {
        let mut db = Database::new();
        for name in ["1NumberPrefix", "Contains Spaces", "HasPunctuation!"] {
            assert_eq!(
                db.create::<Weapon>(name).err(),
                Some(DatabaseError::InvalidName(name.into()))
            );
        }
        assert!(db.is_empty());
    }

    #[test]
    fn names_are_scoped_by_root() {
        let mut db = Database::new();
        db.create::<Weapon>("Iron").unwrap();
        db.create::<Armor>("Iron").unwrap();

        // `Bow` shares the scope of `Weapon`.
        assert_eq!(
            db.create::<Bow>("Iron").err(),
            Some(DatabaseError::Duplicate("Iron".into()))
        );
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn derived_def_through_root_scope() {
        let mut db = Database::new();
        let bow = db.create::<Bow>("Longbow").unwrap();
        bow.borrow_mut().range = 30;

        assert!(db.get::<Weapon>("Longbow").is_none());
        let entry = db.get_erased(TypeId::of::<Weapon>(), "Longbow").unwrap();
        assert_eq!(entry.type_id(), TypeId::of::<Bow>());
        assert!(Rc::ptr_eq(&entry.downcast::<Bow>().unwrap(), &bow));
        assert_eq!(db.get::<Bow>("Longbow").unwrap().borrow().range, 30);
    }

    #[test]
    fn delete_frees_name() {
        let mut db = Database::new();
        let old = db.create::<Weapon>("Club").unwrap();
        let entry = db.delete(&old).unwrap();
        assert_eq!(entry.name(), "Club");

        assert!(db.get::<Weapon>("Club").is_none());
        assert_eq!(db.delete(&old).err(), Some(DatabaseError::NotRegistered));
        assert_eq!(
            db.rename(&old, "Mace").err(),
            Some(DatabaseError::NotRegistered)
        );

        let new = db.create::<Weapon>("Club").unwrap();
        assert!(!Rc::ptr_eq(&old, &new));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn rename() {
        let mut db = Database::new();
        let a = db.create::<Weapon>("A").unwrap();
        db.create::<Weapon>("B").unwrap();

        assert_eq!(db.rename(&a, "B").err(), Some(DatabaseError::Duplicate("B".into())));
        assert_eq!(
            db.rename(&a, "not valid").err(),
            Some(DatabaseError::InvalidName("not valid".into()))
        );
        db.rename(&a, "A").unwrap();
        db.rename(&a, "C").unwrap();

        assert!(db.get::<Weapon>("A").is_none());
        assert!(Rc::ptr_eq(&db.get::<Weapon>("C").unwrap(), &a));
        assert_eq!(db.name_of(&a), Some("C"));
    }

    #[test]
    fn unregistered_handle() {
        let mut db = Database::new();
        let stray = Rc::new(RefCell::new(Weapon::default()));
        assert_eq!(db.name_of(&stray), None);
        assert_eq!(db.delete(&stray).err(), Some(DatabaseError::NotRegistered));
    }

    #[test]
    fn iteration_keeps_creation_order() {
        let mut db = Database::new();
        db.create::<Weapon>("First").unwrap();
        let second = db.create::<Armor>("Second").unwrap();
        db.create::<Bow>("Third").unwrap();
        db.delete(&second).unwrap();

        let names: Vec<_> = db.iter().map(|entry| entry.name()).collect();
        assert_eq!(names, ["First", "Third"]);

        let weapons: Vec<_> = db.iter_type::<Weapon>().map(|(name, _)| name).collect();
        assert_eq!(weapons, ["First"]);

        db.clear();
        assert!(db.is_empty());
        assert_eq!(db.iter().count(), 0);
    }
}
