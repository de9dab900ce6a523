//! Schema implementations for built-in and standard library types.

mod collections;
mod leaf;
mod option;
mod shared;

use alloc::string::String;

/// Concatenates string pieces, used to build generic type names.
///
/// ```
/// assert_eq!(dg_schema::concat(&["Vec<", "u8", ">"]), "Vec<u8>");
/// ```
pub fn concat(pieces: &[&str]) -> String {
    let len = pieces.iter().map(|piece| piece.len()).sum();
    let mut out = String::with_capacity(len);
    pieces.iter().for_each(|piece| out.push_str(piece));
    out
}
