#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

extern crate alloc;

// Generated code names items through `::dg_schema`.
extern crate self as dg_schema;

// -----------------------------------------------------------------------------
// Modules

mod impls;

pub mod cell;
pub mod info;
pub mod registry;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-level exports

pub use impls::concat;
pub use info::{SchemaKind, SchemaNode, Type, TypePath, Typed};
