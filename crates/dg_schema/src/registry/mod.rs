//! Type registry used to resolve type names found in documents.
//!
//! ## Menu
//!
//! - [`TypeTrait`]: a capability attached to a registered type.
//! - [`FromType`]: builds a `TypeTrait` for a concrete type.
//! - [`TypeMeta`]: the [`SchemaNode`](crate::SchemaNode) of a type plus its capability table.
//! - [`GetTypeMeta`]: builds the `TypeMeta` of a type and registers its dependencies.
//! - [`TypeRegistry`]: stores `TypeMeta`s, indexed by `TypeId`, full path and short name.
//!
//! ## auto_register
//!
//! With the `auto_register` feature, types deriving `Recordable` with
//! `#[record(auto_register)]` are collected through [`inventory`] and added by
//! [`TypeRegistry::auto_register`]. Platforms without `inventory` support
//! simply report `false`.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod from_type;
mod type_meta;
mod type_registry;
mod type_trait;

// -----------------------------------------------------------------------------
// Exports

pub use from_type::FromType;
pub use type_meta::{GetTypeMeta, TypeMeta};
pub use type_registry::TypeRegistry;
pub use type_trait::TypeTrait;
