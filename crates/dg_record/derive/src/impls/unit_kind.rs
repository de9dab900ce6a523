use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::RecordEnum;

/// Implementations for enums with unit variants, recorded as leaves.
pub(crate) fn impl_unit_enum(info: &RecordEnum) -> TokenStream {
    let meta = &info.meta;
    let dg_record_path = meta.dg_record_path();
    let schema_node_ = crate::path::schema_node_(dg_record_path);
    let leaf_info_ = crate::path::leaf_info_(dg_record_path);

    let type_path_tokens = super::impl_trait_type_path(meta);
    let typed_tokens = super::impl_trait_typed(
        meta,
        quote! { #schema_node_::Leaf(#leaf_info_::new::<Self>()) },
    );
    let get_type_meta_tokens = super::impl_trait_get_type_meta(meta, crate::utils::empty(), false);
    let recordable_tokens = impl_recordable(info);
    let auto_register_tokens = super::get_auto_register_impl(meta);

    quote! {
        #type_path_tokens

        #typed_tokens

        #get_type_meta_tokens

        #recordable_tokens

        #auto_register_tokens
    }
}

fn impl_recordable(info: &RecordEnum) -> TokenStream {
    let dg_record_path = info.meta.dg_record_path();
    let recordable_ = crate::path::recordable_(dg_record_path);
    let read_context_ = crate::path::read_context_(dg_record_path);
    let write_context_ = crate::path::write_context_(dg_record_path);
    let element_ = crate::path::element_(dg_record_path);
    let default_ = crate::path::default_(dg_record_path);
    let variant_text_ = crate::path::variant_text_(dg_record_path);
    let unknown_variant_ = crate::path::unknown_variant_(dg_record_path);

    let ident = info.meta.ident();

    let read_arms = info.variants.iter().map(|variant| {
        let variant_ident = variant.ident;
        let label = variant.label();
        quote! { #label => *self = Self::#variant_ident, }
    });
    let write_arms = info.variants.iter().map(|variant| {
        let variant_ident = variant.ident;
        let label = variant.label();
        quote! { Self::#variant_ident => #label, }
    });

    quote! {
        impl #recordable_ for #ident {
            #[inline]
            fn create() -> Self {
                <Self as #default_>::default()
            }

            fn read(&mut self, node: &mut #element_, cx: &mut #read_context_<'_>) {
                if let ::core::option::Option::Some(text) = #variant_text_::<Self>(node, cx) {
                    match text {
                        #(#read_arms)*
                        _ => #unknown_variant_::<Self>(text, node, cx),
                    }
                }
            }

            fn write(&self, node: &mut #element_, _cx: &mut #write_context_<'_>) {
                let name: &'static str = match self {
                    #(#write_arms)*
                };
                node.set_text(name);
            }
        }
    }
}
