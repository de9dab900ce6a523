use core::any::TypeId;
use core::fmt;

use dg_schema::registry::TypeRegistry;
use dg_schema::{SchemaKind, SchemaNode};

use crate::ConverterRegistry;

/// How values of a type are read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// A registered converter handles the type entirely.
    Converted,
    /// The default handling of the schema kind.
    Schema(SchemaKind),
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted => f.pad("Converted"),
            Self::Schema(kind) => fmt::Display::fmt(kind, f),
        }
    }
}

/// Classifies the type described by `schema`.
///
/// A converter for the exact type wins over every schema kind. Optional
/// positions classify as their inner type.
///
/// # Examples
///
/// ```
/// use dg_record::{Capabilities, Classification, Converter, ConverterRegistry, classify};
/// use dg_record::__macro_exports::dg_schema::{SchemaKind, Typed};
///
/// let mut converters = ConverterRegistry::new();
/// converters.register(Converter::new("hex").with(Capabilities::<u8>::new().from_text(|t| {
///     Ok(Some(u8::from_str_radix(t, 16)?))
/// })));
///
/// assert_eq!(classify(u8::schema(), &converters), Classification::Converted);
/// assert_eq!(classify(<Option<u8>>::schema(), &converters), Classification::Converted);
/// assert_eq!(
///     classify(<Vec<u8>>::schema(), &converters),
///     Classification::Schema(SchemaKind::Sequence)
/// );
/// ```
pub fn classify(schema: &SchemaNode, converters: &ConverterRegistry) -> Classification {
    if converters.contains(schema.ty().id()) {
        return Classification::Converted;
    }

    let inner = schema.inner();
    if converters.contains(inner.ty().id()) {
        return Classification::Converted;
    }
    Classification::Schema(inner.kind())
}

/// Classifies a registered type. `None` if `type_id` is not registered.
pub fn classify_type(
    type_id: TypeId,
    registry: &TypeRegistry,
    converters: &ConverterRegistry,
) -> Option<Classification> {
    registry
        .get_schema(type_id)
        .map(|schema| classify(schema, converters))
}
