use proc_macro2::Span;
use syn::{Field, Fields, Ident, Type, spanned::Spanned};

use super::{FieldAttributes, RecordMeta};

// -----------------------------------------------------------------------------
// Define

pub(crate) struct RecordStruct<'a> {
    pub meta: RecordMeta<'a>,
    pub fields: Vec<StructField<'a>>,
}

/// Represents a field on a struct.
pub(crate) struct StructField<'a> {
    /// The raw field.
    pub data: &'a Field,
    pub ident: &'a Ident,
    /// The `#[record(...)]` attributes on the field.
    pub attrs: FieldAttributes,
}

// -----------------------------------------------------------------------------
// StructField Implementation

impl StructField<'_> {
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.data.ty
    }

    /// The element label; the field name unless renamed.
    pub fn label(&self) -> String {
        match &self.attrs.rename {
            Some(rename) => rename.value(),
            None => self.ident.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// RecordStruct Implementation

impl<'a> RecordStruct<'a> {
    pub fn new(meta: RecordMeta<'a>, fields: &'a Fields) -> syn::Result<Self> {
        let named = match fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new(
                    unnamed.span(),
                    "tuple structs cannot be recorded; fields need labels",
                ));
            }
        };

        let fields = named
            .into_iter()
            .map(|data| {
                let ident = data
                    .ident
                    .as_ref()
                    .ok_or_else(|| syn::Error::new(data.span(), "unnamed field"))?;
                Ok(StructField {
                    data,
                    ident,
                    attrs: FieldAttributes::parse_attrs(&data.attrs)?,
                })
            })
            .collect::<syn::Result<Vec<_>>>()?;

        let this = Self { meta, fields };
        this.validate()?;
        Ok(this)
    }

    fn validate(&self) -> syn::Result<()> {
        let mut bases = self.fields.iter().filter(|field| field.attrs.base.is_some());
        bases.next();
        if let Some(extra) = bases.next() {
            return Err(syn::Error::new(
                extra.attrs.base.unwrap_or_else(Span::call_site),
                "a type has at most one base",
            ));
        }

        let mut labels = Vec::new();
        for field in self.serialized_fields() {
            let label = field.label();
            if labels.contains(&label) {
                return Err(syn::Error::new(
                    field.data.span(),
                    format!("label `{label}` is used by two fields"),
                ));
            }
            labels.push(label);
        }
        Ok(())
    }

    /// Fields written as child elements.
    pub fn serialized_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|field| field.attrs.is_serialized())
    }

    /// Fields receiving the instance index.
    pub fn index_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|field| field.attrs.index.is_some())
    }

    pub fn base(&self) -> Option<&StructField<'a>> {
        self.fields.iter().find(|field| field.attrs.base.is_some())
    }

    pub fn has_index(&self) -> bool {
        self.index_fields().next().is_some()
    }
}
