use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

use crate::derive_data::RecordMeta;

/// Generate implementation code for `GetTypeMeta` trait.
///
/// `register_deps_tokens` registers the field types. Composites also carry
/// a `TypeTraitRecord`, so shared objects of them can be created from a
/// class name.
pub(crate) fn impl_trait_get_type_meta(
    meta: &RecordMeta,
    register_deps_tokens: TokenStream,
    with_record_trait: bool,
) -> TokenStream {
    let dg_record_path = meta.dg_record_path();
    let get_type_meta_ = crate::path::get_type_meta_(dg_record_path);
    let type_meta_ = crate::path::type_meta_(dg_record_path);

    let outer_ = Ident::new("__outer", Span::call_site());

    let body = if with_record_trait {
        let from_type_ = crate::path::from_type_(dg_record_path);
        let type_trait_record_ = crate::path::type_trait_record_(dg_record_path);
        quote! {
            let mut #outer_ = #type_meta_::with_capacity::<Self>(1);
            #type_meta_::insert_trait::<#type_trait_record_>(&mut #outer_, #from_type_::<Self>::from_type());
            #outer_
        }
    } else {
        quote! {
            #type_meta_::of::<Self>()
        }
    };

    let ident = meta.ident();

    quote! {
        impl #get_type_meta_ for #ident {
            fn get_type_meta() -> #type_meta_ {
                #body
            }

            #register_deps_tokens
        }
    }
}
