//! Paths of the items generated code refers to.
//!
//! Everything goes through `dg_record::__macro_exports`, so moving an item
//! inside the runtime crates only touches that module.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the access path to the `dg_record` crate from the invoking crate.
///
/// 1. For crates that depend on `dg_record`, `::dg_record` is returned.
/// 2. For crates that depend on a facade (`defgraph`, `dg_core`, `dg`),
///    `::<facade>::record` is returned.
/// 3. Otherwise `::dg_record` is returned, which may be incorrect.
///
/// Reading the manifest is relatively expensive, so the path is computed
/// once per derive and passed around.
pub(crate) fn dg_record() -> syn::Path {
    dg_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("dg_record"))
}

// -----------------------------------------------------------------------------
// Items

macro_rules! export_paths {
    ($($fn_name:ident => $item:ident,)*) => {$(
        #[inline(always)]
        pub(crate) fn $fn_name(dg_record_path: &syn::Path) -> TokenStream {
            quote! { #dg_record_path::__macro_exports::$item }
        }
    )*};
}

export_paths! {
    type_path_ => TypePath,
    typed_ => Typed,
    schema_node_ => SchemaNode,
    non_generic_schema_cell_ => NonGenericSchemaCell,
    composite_info_ => CompositeInfo,
    field_descriptor_ => FieldDescriptor,
    leaf_info_ => LeafInfo,
    get_type_meta_ => GetTypeMeta,
    type_meta_ => TypeMeta,
    type_registry_ => TypeRegistry,
    from_type_ => FromType,
    type_trait_record_ => TypeTraitRecord,
    recordable_ => Recordable,
    record_fields_ => RecordFields,
    field_reader_ => FieldReader,
    field_writer_ => FieldWriter,
    read_context_ => ReadContext,
    write_context_ => WriteContext,
    element_ => Element,
    erased_shared_ => ErasedShared,
    index_registry_ => IndexRegistry,
    def_ => Def,
    type_id_ => TypeId,
    default_ => Default,
    variant_text_ => variant_text,
    unknown_variant_ => unknown_variant,
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(dg_record_path: &syn::Path) -> TokenStream {
    quote! {
        #dg_record_path::__macro_exports::auto_register
    }
}
