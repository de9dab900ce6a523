//! Static storage for schema nodes and generated type names.
//!
//! [`Typed::schema`](crate::Typed::schema) and the [`TypePath`](crate::TypePath)
//! methods return `&'static` data that is built on first use.
//!
//! - [`NonGenericSchemaCell`]: one node per implementation, a plain [`OnceLock`].
//! - [`GenericSchemaCell`] / [`GenericTypePathCell`]: a `static` inside a
//!   generic function is shared by every instantiation, so these cells keep a
//!   [`TypeIdMap`] behind a [`RwLock`] and leak one value per type.
//!
//! ## Examples
//!
//! ```
//! use dg_schema::{SchemaNode, TypePath, Typed};
//! use dg_schema::cell::NonGenericSchemaCell;
//! use dg_schema::info::LeafInfo;
//!
//! struct Meters(f32);
//!
//! impl TypePath for Meters {
//!     fn type_path() -> &'static str { "demo::Meters" }
//!     fn type_name() -> &'static str { "Meters" }
//! }
//!
//! impl Typed for Meters {
//!     fn schema() -> &'static SchemaNode {
//!         static CELL: NonGenericSchemaCell = NonGenericSchemaCell::new();
//!         CELL.get_or_init(|| SchemaNode::Leaf(LeafInfo::new::<Self>()))
//!     }
//! }
//!
//! assert_eq!(Meters::schema().ty().name(), "Meters");
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use dg_utils::TypeIdMap;

use crate::info::SchemaNode;

mod sealed {
    use super::SchemaNode;
    use alloc::string::String;

    pub trait CellValue: Send + Sync + 'static {}

    impl CellValue for String {}
    impl CellValue for SchemaNode {}
}

use sealed::CellValue;

// -----------------------------------------------------------------------------
// NonGenericCell

/// Storage for the data of a non-generic type.
pub struct NonGenericCell<T: CellValue>(OnceLock<T>);

/// Storage for the [`SchemaNode`] of a non-generic type.
pub type NonGenericSchemaCell = NonGenericCell<SchemaNode>;

impl<T: CellValue> NonGenericCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored value, building it with `f` on first access.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// GenericCell

/// Storage for per-instantiation data of a generic type.
pub struct GenericCell<T: CellValue>(RwLock<TypeIdMap<&'static T>>);

/// Storage for the [`SchemaNode`] of each instantiation of a generic type.
pub type GenericSchemaCell = GenericCell<SchemaNode>;

/// Storage for a generated type name of each instantiation of a generic type.
///
/// ```
/// use dg_schema::TypePath;
/// use dg_schema::cell::GenericTypePathCell;
///
/// struct Pair<T>(T, T);
///
/// impl<T: TypePath> TypePath for Pair<T> {
///     fn type_path() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| dg_schema::concat(&["demo::Pair<", T::type_path(), ">"]))
///     }
///     fn type_name() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| dg_schema::concat(&["Pair<", T::type_name(), ">"]))
///     }
/// }
///
/// assert_eq!(<Pair<u8>>::type_name(), "Pair<u8>");
/// assert_eq!(<Pair<i64>>::type_path(), "demo::Pair<i64>");
/// ```
pub type GenericTypePathCell = GenericCell<String>;

impl<T: CellValue> GenericCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the value stored for `G`, building it with `f` on first access.
    ///
    /// `f` runs without holding the lock, so it may query other cells.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &T {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &T {
        match self.get_by_type_id(type_id) {
            Some(value) => value,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&T> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: T) -> &T {
        let leaked: &'static T = *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(Box::new(value)));
        leaked
    }
}
