use crate::info::{SchemaNode, TypePath};

/// Access to the static [`SchemaNode`] of a type.
///
/// The node is built on first access and cached for the life of the program,
/// see [`cell`](crate::cell). Field and item schemas are stored as function
/// pointers, so recursive types do not recurse during construction.
pub trait Typed: TypePath {
    fn schema() -> &'static SchemaNode;
}
