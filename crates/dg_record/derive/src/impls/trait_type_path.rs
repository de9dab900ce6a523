use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::RecordMeta;

/// Generate implementation codes for `TypePath`
pub(crate) fn impl_trait_type_path(meta: &RecordMeta) -> TokenStream {
    let type_path_ = crate::path::type_path_(meta.dg_record_path());

    let ident = meta.ident();
    let type_path = meta.type_path();
    let type_name = meta.type_name();

    quote! {
        impl #type_path_ for #ident {
            #[inline]
            fn type_path() -> &'static str {
                #type_path
            }

            #[inline]
            fn type_name() -> &'static str {
                #type_name
            }
        }
    }
}
