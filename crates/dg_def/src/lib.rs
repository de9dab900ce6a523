#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Extern Self

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod database;
mod error;
mod index;
mod name;
mod shared;

// -----------------------------------------------------------------------------
// Exports

pub use database::{Database, DefEntry};
pub use error::DatabaseError;
pub use index::IndexRegistry;
pub use name::is_valid_def_name;
pub use shared::{Def, ErasedShared, Shared, erase, ptr_key};
