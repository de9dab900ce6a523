//! Parsing of `#[record(...)]` attributes.

use proc_macro2::Span;
use syn::{Attribute, LitStr, meta::ParseNestedMeta};

use crate::RECORD_ATTRIBUTE_NAME;

fn set_flag(flag: &mut Option<Span>, meta: &ParseNestedMeta) -> syn::Result<()> {
    if flag.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *flag = Some(meta.path.get_ident().map_or_else(Span::call_site, |ident| ident.span()));
    Ok(())
}

fn record_attributes(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(RECORD_ATTRIBUTE_NAME))
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Attributes placed on the type.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    /// `#[record(def)]`
    pub def: Option<Span>,
    /// `#[record(clone)]`
    pub clone: Option<Span>,
    /// `#[record(auto_register)]`
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in record_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("def") {
                    set_flag(&mut this.def, &meta)
                } else if meta.path.is_ident("clone") {
                    set_flag(&mut this.clone, &meta)
                } else if meta.path.is_ident("auto_register") {
                    set_flag(&mut this.auto_register, &meta)
                } else {
                    Err(meta.error("expected `def`, `clone` or `auto_register`"))
                }
            })?;
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Attributes placed on a field or an enum variant.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    /// `#[record(base)]`
    pub base: Option<Span>,
    /// `#[record(index)]`
    pub index: Option<Span>,
    /// `#[record(skip)]`
    pub skip: Option<Span>,
    /// `#[record(rename = "...")]`
    pub rename: Option<LitStr>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in record_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("base") {
                    set_flag(&mut this.base, &meta)
                } else if meta.path.is_ident("index") {
                    set_flag(&mut this.index, &meta)
                } else if meta.path.is_ident("skip") {
                    set_flag(&mut this.skip, &meta)
                } else if meta.path.is_ident("rename") {
                    if this.rename.is_some() {
                        return Err(meta.error("duplicate attribute"));
                    }
                    this.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `base`, `index`, `skip` or `rename`"))
                }
            })?;
        }

        let roles = [this.base, this.index, this.skip].iter().flatten().count();
        if roles > 1 {
            return Err(syn::Error::new(
                this.base.or(this.index).or(this.skip).unwrap_or_else(Span::call_site),
                "`base`, `index` and `skip` exclude each other",
            ));
        }
        if let Some(rename) = &this.rename
            && roles > 0
        {
            return Err(syn::Error::new(
                rename.span(),
                "only serialized fields can be renamed",
            ));
        }
        Ok(this)
    }

    /// Whether the field is one child element of its own.
    #[inline]
    pub fn is_serialized(&self) -> bool {
        self.base.is_none() && self.index.is_none() && self.skip.is_none()
    }
}
