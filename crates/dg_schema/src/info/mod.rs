//! Schema information attached to every recordable type.
//!
//! ## Menu
//!
//! - [`TypePath`]: the full path and the short name of a type.
//! - [`Type`]: a copyable handle combining a [`TypeId`](core::any::TypeId) with its names.
//! - [`Typed`]: access to the cached [`SchemaNode`] of a type.
//! - [`SchemaNode`]: one of
//!     - [`LeafInfo`] for atomic values and strings,
//!     - [`CompositeInfo`] for types with named fields,
//!     - [`SequenceInfo`], [`ArrayInfo`] and [`MapInfo`] for collections,
//!     - [`ReferenceInfo`] for shared handles,
//!     - [`OptionalInfo`] for nullable positions.

// -----------------------------------------------------------------------------
// Modules

mod composite;
mod container;
mod leaf;
mod reference;
mod schema;
mod type_path;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use composite::{BaseInfo, CompositeInfo, FieldConflict, FieldDescriptor};
pub use container::{ArrayInfo, MapInfo, OptionalInfo, SequenceInfo};
pub use leaf::LeafInfo;
pub use reference::ReferenceInfo;
pub use schema::{SchemaKind, SchemaKindError, SchemaNode};
pub use type_path::{Type, TypePath};
pub use typed::Typed;
