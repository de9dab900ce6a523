//! `Recordable` for leaves, strings, collections, `Option` and shared
//! handles.

mod collections;
mod leaf;
mod map;
mod option;
mod shared;

pub(crate) use shared::populate_shared;
