//! See [`Recordable`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static RECORD_ATTRIBUTE_NAME: &str = "record";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Record Derivation
///
/// `#[derive(Recordable)]` implements the following traits:
///
/// - `TypePath`
/// - `Typed`
/// - `GetTypeMeta`
/// - `Recordable`
/// - `RecordFields` (structs only)
/// - `Def` (with `#[record(def)]`)
///
/// The type must implement `Default`; it provides the value a missing or
/// broken element falls back to.
///
/// Structs with named fields become composites; each field is one child
/// element labelled with the field name. Enums whose variants are all units
/// become leaves written as the variant name. Generic types and tuple
/// structs are not supported.
///
/// ## Type Attributes
///
/// - `def`: the type is a def and lives in the database under its name.
///   A def with a `base` shares the name scope of its base, which must be a
///   def too.
/// - `clone`: values read by value (not behind `Shared`) receive an index
///   and a copy of them is stored in the index registry. Requires `Clone`.
/// - `auto_register`: the type is registered by every new session when the
///   `auto_register` feature is enabled.
///
/// ```rust, ignore
/// #[derive(Recordable, Default)]
/// #[record(def, auto_register)]
/// struct ItemDef {
///     price: i32,
/// }
/// ```
///
/// ## Field Attributes
///
/// - `base`: the field embeds the base of the type. Its fields are read and
///   written as if declared here; a field declared here hides a base field
///   with the same label. At most one field may be a base.
/// - `index`: a `usize` receiving the instance index. Not serialized.
/// - `skip`: not serialized.
/// - `rename = "label"`: the element label of the field (or the name of a
///   variant).
///
/// ```rust, ignore
/// #[derive(Recordable, Default)]
/// #[record(def)]
/// struct WeaponDef {
///     #[record(base)]
///     item: ItemDef,
///     #[record(index)]
///     index: usize,
///     #[record(rename = "dmg")]
///     damage: f32,
/// }
/// ```
#[proc_macro_derive(Recordable, attributes(record))]
pub fn derive_recordable(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match impls::match_record_impls(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
