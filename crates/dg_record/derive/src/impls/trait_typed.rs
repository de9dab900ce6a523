use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::RecordMeta;

/// Generate implementation code for `Typed`
///
/// `schema_tokens` builds the `SchemaNode`, see [`impl_struct`] and
/// [`impl_unit_enum`].
///
/// [`impl_struct`]: super::impl_struct
/// [`impl_unit_enum`]: super::impl_unit_enum
pub(crate) fn impl_trait_typed(meta: &RecordMeta, schema_tokens: TokenStream) -> TokenStream {
    let dg_record_path = meta.dg_record_path();
    let typed_ = crate::path::typed_(dg_record_path);
    let schema_node_ = crate::path::schema_node_(dg_record_path);
    let cell_ = crate::path::non_generic_schema_cell_(dg_record_path);

    let ident = meta.ident();

    quote! {
        impl #typed_ for #ident {
            fn schema() -> &'static #schema_node_ {
                static CELL: #cell_ = #cell_::new();
                CELL.get_or_init(|| {
                    #schema_tokens
                })
            }
        }
    }
}
