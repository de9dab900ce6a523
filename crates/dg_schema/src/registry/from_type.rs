use crate::info::Typed;

/// Builds a capability value for the concrete type `T`.
///
/// Capabilities are usually structs of function pointers that are generic
/// over `T` internally but erased in their signature.
pub trait FromType<T: Typed> {
    fn from_type() -> Self;
}
