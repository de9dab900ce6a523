use syn::{DataEnum, Fields, Ident, spanned::Spanned};

use super::{FieldAttributes, RecordMeta};

// -----------------------------------------------------------------------------
// Define

pub(crate) struct RecordEnum<'a> {
    pub meta: RecordMeta<'a>,
    pub variants: Vec<UnitVariant<'a>>,
}

/// A fieldless variant, written as its name.
pub(crate) struct UnitVariant<'a> {
    pub ident: &'a Ident,
    pub attrs: FieldAttributes,
}

impl UnitVariant<'_> {
    /// The text naming the variant.
    pub fn label(&self) -> String {
        match &self.attrs.rename {
            Some(rename) => rename.value(),
            None => self.ident.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// RecordEnum Implementation

impl<'a> RecordEnum<'a> {
    pub fn new(meta: RecordMeta<'a>, data: &'a DataEnum) -> syn::Result<Self> {
        if let Some(span) = meta.attrs().def.or(meta.attrs().clone) {
            return Err(syn::Error::new(span, "only structs can be defs or indexed"));
        }

        if data.variants.is_empty() {
            return Err(syn::Error::new(
                data.enum_token.span,
                "an enum without variants has no value to record",
            ));
        }

        let mut variants = Vec::with_capacity(data.variants.len());
        for variant in &data.variants {
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new(
                    variant.fields.span(),
                    "only enums with unit variants can be recorded",
                ));
            }
            let attrs = FieldAttributes::parse_attrs(&variant.attrs)?;
            if let Some(span) = attrs.base.or(attrs.index).or(attrs.skip) {
                return Err(syn::Error::new(span, "variants can only be renamed"));
            }
            variants.push(UnitVariant {
                ident: &variant.ident,
                attrs,
            });
        }

        let mut labels = Vec::new();
        for variant in &variants {
            let label = variant.label();
            if labels.contains(&label) {
                return Err(syn::Error::new(
                    variant.ident.span(),
                    format!("`{label}` names two variants"),
                ));
            }
            labels.push(label);
        }

        Ok(Self { meta, variants })
    }
}
