use quote::quote_spanned;

use crate::derive_data::RecordMeta;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &RecordMeta) -> proc_macro2::TokenStream {
    if let Some(span) = meta.attrs().auto_register {
        let auto_register_ = crate::path::auto_register_(meta.dg_record_path());
        let ident = meta.ident();

        quote_spanned! { span =>
            #auto_register_::inventory::submit!{
                #auto_register_::__AutoRegisterFunc(
                    <#ident as #auto_register_::__RegisterType>::__register
                )
            }
        }
    } else {
        crate::utils::empty()
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &RecordMeta) -> proc_macro2::TokenStream {
    crate::utils::empty()
}
