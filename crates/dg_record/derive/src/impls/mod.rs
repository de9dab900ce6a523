// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod struct_kind;
mod trait_get_type_meta;
mod trait_type_path;
mod trait_typed;
mod unit_kind;

// -----------------------------------------------------------------------------
// Internal API

use auto_register::get_auto_register_impl;
use struct_kind::impl_struct;
use trait_get_type_meta::impl_trait_get_type_meta;
use trait_type_path::impl_trait_type_path;
use trait_typed::impl_trait_typed;
use unit_kind::impl_unit_enum;

use proc_macro2::TokenStream;
use syn::{Data, DeriveInput, GenericParam, spanned::Spanned};

use crate::derive_data::{RecordEnum, RecordMeta, RecordStruct, TypeAttributes};

/// Entry of `#[derive(Recordable)]`.
pub(crate) fn match_record_impls(ast: &DeriveInput) -> syn::Result<TokenStream> {
    if let Some(param) = ast
        .generics
        .params
        .iter()
        .find(|param| !matches!(param, GenericParam::Lifetime(_)))
    {
        return Err(syn::Error::new(
            param.span(),
            "generic types cannot be recorded",
        ));
    }
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new(
            ast.generics.span(),
            "recorded types cannot borrow",
        ));
    }

    let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let meta = RecordMeta::new(attrs, &ast.ident);

    match &ast.data {
        Data::Struct(data) => Ok(impl_struct(&RecordStruct::new(meta, &data.fields)?)),
        Data::Enum(data) => Ok(impl_unit_enum(&RecordEnum::new(meta, data)?)),
        Data::Union(data) => Err(syn::Error::new(
            data.union_token.span(),
            "unions cannot be recorded",
        )),
    }
}
