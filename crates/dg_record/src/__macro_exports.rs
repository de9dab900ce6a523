//! Items used by code generated in `dg_record_derive`. Not public API.

pub use alloc::boxed::Box;
pub use alloc::string::String;
pub use alloc::vec::Vec;
pub use core::any::TypeId;
pub use core::default::Default;
pub use core::option::Option;

pub use dg_def;
pub use dg_schema;

pub use dg_def::{Def, ErasedShared, IndexRegistry};
pub use dg_schema::cell::NonGenericSchemaCell;
pub use dg_schema::info::{CompositeInfo, FieldDescriptor, LeafInfo};
pub use dg_schema::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry};
pub use dg_schema::{SchemaNode, TypePath, Typed};

pub use crate::xml::Element;
pub use crate::{FieldReader, FieldWriter, ReadContext, RecordFields, Recordable};
pub use crate::{TypeTraitRecord, WriteContext};

pub mod auto_register {
    pub use dg_schema::__macro_exports::auto_register::*;
}

/// Trimmed text naming a unit enum variant, or `None` after reporting
/// elements inside it.
pub fn variant_text<'n, T: TypePath>(node: &'n Element, cx: &mut ReadContext<'_>) -> Option<&'n str> {
    if node.has_children() {
        cx.error(node, alloc::format!("{} cannot contain elements", T::type_name()));
        return None;
    }
    Some(node.text().map(str::trim).unwrap_or(""))
}

pub fn unknown_variant<T: TypePath>(text: &str, node: &Element, cx: &mut ReadContext<'_>) {
    cx.error(
        node,
        alloc::format!("\"{text}\" is not a variant of {}", T::type_name()),
    );
}
