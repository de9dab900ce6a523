use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, Path};

use super::TypeAttributes;

/// What every derived implementation needs to know about the type.
pub(crate) struct RecordMeta<'a> {
    dg_record_path: Path,
    attrs: TypeAttributes,
    ident: &'a Ident,
}

impl core::fmt::Debug for RecordMeta<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordMeta")
            .field("ident", self.ident)
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl<'a> RecordMeta<'a> {
    #[inline]
    pub fn new(attrs: TypeAttributes, ident: &'a Ident) -> Self {
        Self {
            dg_record_path: crate::path::dg_record(),
            attrs,
            ident,
        }
    }

    #[inline]
    pub fn dg_record_path(&self) -> &Path {
        &self.dg_record_path
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    /// This name is used in `impl ... for #ident {...}`.
    #[inline]
    pub fn ident(&self) -> &'a Ident {
        self.ident
    }

    /// `concat!(module_path!(), "::Name")`
    pub fn type_path(&self) -> TokenStream {
        let suffix = format!("::{}", self.ident);
        quote! {
            ::core::concat!(::core::module_path!(), #suffix)
        }
    }

    /// The short name, also used as the element tag of defs.
    pub fn type_name(&self) -> String {
        self.ident.to_string()
    }
}
