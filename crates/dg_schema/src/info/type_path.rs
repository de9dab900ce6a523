use core::any::TypeId;
use core::fmt;

/// Stable names of a type.
///
/// `type_path` is the full path (`my_game::items::Sword`), `type_name` the
/// short name used as a document tag (`Sword`). Generic types spell their
/// arguments in both forms (`alloc::vec::Vec<i32>` / `Vec<i32>`).
///
/// # Examples
///
/// ```
/// use dg_schema::TypePath;
///
/// assert_eq!(<Vec<u8>>::type_path(), "alloc::vec::Vec<u8>");
/// assert_eq!(<Vec<u8>>::type_name(), "Vec<u8>");
/// ```
pub trait TypePath: 'static {
    /// Full path of the type.
    fn type_path() -> &'static str;

    /// Short name of the type.
    fn type_name() -> &'static str;
}

// -----------------------------------------------------------------------------
// Type

/// A copyable handle naming one type.
///
/// `Type` is itself a leaf value: it is written as its full path and read
/// back through a [`TypeRegistry`](crate::registry::TypeRegistry).
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
    name: &'static str,
}

impl Type {
    #[inline]
    pub fn of<T: TypePath + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: T::type_path(),
            name: T::type_name(),
        }
    }

    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is<T: 'static + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl core::hash::Hash for Type {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.path).finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.path)
    }
}
