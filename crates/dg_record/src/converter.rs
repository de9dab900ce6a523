use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use bitflags::bitflags;
use dg_schema::TypePath;
use dg_utils::TypeIdMap;
use thiserror::Error;

use crate::fields::{FieldReader, FieldWriter, Recorder};
use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

/// Error returned by user conversion code.
pub type ConvertError = Box<dyn core::error::Error + Send + Sync>;

// -----------------------------------------------------------------------------
// CapabilityFlags

bitflags! {
    /// Which conversions a converter provides for one type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CapabilityFlags: u8 {
        const FROM_TEXT = 1 << 0;
        const FROM_TREE = 1 << 1;
        const TO_TEXT = 1 << 2;
        const RECORD = 1 << 3;
    }
}

impl fmt::Display for CapabilityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

// -----------------------------------------------------------------------------
// Capabilities

type FromText<T> = Box<dyn Fn(&str) -> Result<Option<T>, ConvertError>>;
type FromTree<T> = Box<dyn Fn(&Element) -> Result<Option<T>, ConvertError>>;
type ToText<T> = Box<dyn Fn(&T) -> Result<String, ConvertError>>;
type RecordFn<T> = Box<dyn Fn(&mut T, &mut Recorder<'_, '_>) -> Result<(), ConvertError>>;

struct RecordCapability<T> {
    record: RecordFn<T>,
    snapshot: fn(&T) -> T,
}

/// The conversions a converter provides for `T`.
///
/// `from_text` and `from_tree` may return `Ok(None)`, which makes a nullable
/// position null. `record` visits fields the same way derived composites do;
/// it reads in place and writes a clone of the value.
///
/// # Examples
///
/// ```
/// use dg_record::{Capabilities, CapabilityFlags};
///
/// let caps = Capabilities::<u32>::new()
///     .from_text(|text| Ok(Some(text.len() as u32)))
///     .to_text(|value| Ok("x".repeat(*value as usize)));
///
/// assert_eq!(caps.flags(), CapabilityFlags::FROM_TEXT | CapabilityFlags::TO_TEXT);
/// ```
pub struct Capabilities<T> {
    from_text: Option<FromText<T>>,
    from_tree: Option<FromTree<T>>,
    to_text: Option<ToText<T>>,
    record: Option<RecordCapability<T>>,
}

impl<T> Default for Capabilities<T> {
    fn default() -> Self {
        Self {
            from_text: None,
            from_tree: None,
            to_text: None,
            record: None,
        }
    }
}

impl<T: 'static> Capabilities<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(
        mut self,
        f: impl Fn(&str) -> Result<Option<T>, ConvertError> + 'static,
    ) -> Self {
        self.from_text = Some(Box::new(f));
        self
    }

    pub fn from_tree(
        mut self,
        f: impl Fn(&Element) -> Result<Option<T>, ConvertError> + 'static,
    ) -> Self {
        self.from_tree = Some(Box::new(f));
        self
    }

    pub fn to_text(mut self, f: impl Fn(&T) -> Result<String, ConvertError> + 'static) -> Self {
        self.to_text = Some(Box::new(f));
        self
    }

    pub fn record(
        mut self,
        f: impl Fn(&mut T, &mut Recorder<'_, '_>) -> Result<(), ConvertError> + 'static,
    ) -> Self
    where
        T: Clone,
    {
        self.record = Some(RecordCapability {
            record: Box::new(f),
            snapshot: T::clone,
        });
        self
    }

    pub fn flags(&self) -> CapabilityFlags {
        let mut flags = CapabilityFlags::empty();
        flags.set(CapabilityFlags::FROM_TEXT, self.from_text.is_some());
        flags.set(CapabilityFlags::FROM_TREE, self.from_tree.is_some());
        flags.set(CapabilityFlags::TO_TEXT, self.to_text.is_some());
        flags.set(CapabilityFlags::RECORD, self.record.is_some());
        flags
    }
}

// -----------------------------------------------------------------------------
// Converter

struct Claim {
    ty: TypeId,
    type_name: &'static str,
    flags: CapabilityFlags,
    capabilities: Box<dyn Any>,
}

/// A named set of capabilities, one per handled type.
pub struct Converter {
    name: String,
    claims: Vec<Claim>,
}

impl Converter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            claims: Vec::new(),
        }
    }

    /// Adds `T` to the handled types.
    pub fn with<T: TypePath>(mut self, capabilities: Capabilities<T>) -> Self {
        self.claims.push(Claim {
            ty: TypeId::of::<T>(),
            type_name: T::type_name(),
            flags: capabilities.flags(),
            capabilities: Box::new(capabilities),
        });
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("types", &self.claims.iter().map(|c| c.type_name).collect::<Vec<_>>())
            .finish()
    }
}

/// A registration problem. The offending claim is dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConverterError {
    #[error("converter `{0}` handles no type")]
    Empty(String),

    #[error("converter `{converter}` provides no capability for `{ty}`")]
    NoCapability { converter: String, ty: &'static str },

    #[error("converter `{converter}` claims `{ty}`, already handled by `{existing}`")]
    Overlap {
        converter: String,
        ty: &'static str,
        existing: String,
    },
}

// -----------------------------------------------------------------------------
// ConverterRegistry

struct Entry {
    converter: String,
    flags: CapabilityFlags,
    capabilities: Box<dyn Any>,
}

/// Converters by handled type. At most one converter per type.
#[derive(Default)]
pub struct ConverterRegistry {
    entries: TypeIdMap<Entry>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every claim of `converter`.
    ///
    /// Claims on a type that is already handled are dropped and reported.
    pub fn register(&mut self, converter: Converter) -> Vec<ConverterError> {
        let Converter { name, claims } = converter;
        if claims.is_empty() {
            return alloc::vec![ConverterError::Empty(name)];
        }

        let mut errors = Vec::new();
        for claim in claims {
            if claim.flags.is_empty() {
                errors.push(ConverterError::NoCapability {
                    converter: name.clone(),
                    ty: claim.type_name,
                });
                continue;
            }
            if let Some(existing) = self.entries.get(&claim.ty) {
                errors.push(ConverterError::Overlap {
                    converter: name.clone(),
                    ty: claim.type_name,
                    existing: existing.converter.clone(),
                });
                continue;
            }
            self.entries.insert(
                claim.ty,
                Entry {
                    converter: name.clone(),
                    flags: claim.flags,
                    capabilities: claim.capabilities,
                },
            );
        }
        errors
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains(&type_id)
    }

    pub fn get<T: 'static>(&self) -> Option<&Capabilities<T>> {
        self.lookup::<T>().map(|(_, caps)| caps)
    }

    pub fn flags(&self, type_id: TypeId) -> Option<CapabilityFlags> {
        self.entries.get(&type_id).map(|entry| entry.flags)
    }

    /// Name of the converter handling `type_id`.
    pub fn converter_name(&self, type_id: TypeId) -> Option<&str> {
        self.entries.get(&type_id).map(|entry| entry.converter.as_str())
    }

    pub(crate) fn lookup<T: 'static>(&self) -> Option<(&str, &Capabilities<T>)> {
        let entry = self.entries.get_type::<T>()?;
        let caps = entry.capabilities.downcast_ref::<Capabilities<T>>()?;
        Some((entry.converter.as_str(), caps))
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Dispatch

/// Reads `node` through a converter.
///
/// `model` is the value to keep when nothing better can be produced. A
/// non-nullable position always yields `Some`.
pub(crate) fn read_converted<T: Recordable>(
    converter: &str,
    caps: &Capabilities<T>,
    model: Option<T>,
    nullable: bool,
    node: &mut Element,
    cx: &mut ReadContext<'_>,
) -> Option<T> {
    let fallback = |model: Option<T>| match model {
        Some(value) => Some(value),
        None if nullable => None,
        None => Some(T::create()),
    };

    if node.has_text() && node.has_children() {
        cx.error(
            node,
            format!("{} has both text and elements; reading the text", T::type_name()),
        );
    }

    let result = if node.has_text() || !node.has_children() {
        let text = node.text().map(str::trim).unwrap_or("");
        if let Some(from_text) = &caps.from_text {
            from_text(text)
        } else if let Some(record) = &caps.record {
            return read_recorded(converter, record, model, nullable, node, cx);
        } else if let Some(from_tree) = &caps.from_tree {
            from_tree(node)
        } else {
            cx.error(
                node,
                format!("converter `{converter}` cannot read {} from text", T::type_name()),
            );
            return fallback(model);
        }
    } else if let Some(from_tree) = &caps.from_tree {
        from_tree(node)
    } else if let Some(record) = &caps.record {
        return read_recorded(converter, record, model, nullable, node, cx);
    } else {
        cx.error(
            node,
            format!("converter `{converter}` cannot read {} from elements", T::type_name()),
        );
        return fallback(model);
    };

    match result {
        Ok(Some(value)) => Some(value),
        Ok(None) if nullable => None,
        Ok(None) => {
            cx.error(
                node,
                format!("converter `{converter}` produced null for non-nullable {}", T::type_name()),
            );
            fallback(model)
        }
        Err(err) => {
            cx.exception(node, format!("converter `{converter}` failed: {err}"));
            if nullable { None } else { Some(T::create()) }
        }
    }
}

fn read_recorded<T: Recordable>(
    converter: &str,
    record: &RecordCapability<T>,
    model: Option<T>,
    nullable: bool,
    node: &mut Element,
    cx: &mut ReadContext<'_>,
) -> Option<T> {
    let mut value = model.unwrap_or_else(T::create);

    let mut recorder = Recorder::Read(FieldReader::new(node, cx, T::type_name()));
    let result = (record.record)(&mut value, &mut recorder);
    if let Recorder::Read(reader) = recorder {
        reader.finish();
    }

    match result {
        Ok(()) => Some(value),
        Err(err) => {
            cx.exception(node, format!("converter `{converter}` failed: {err}"));
            if nullable { None } else { Some(T::create()) }
        }
    }
}

/// Writes `value` through a converter. Returns `false` if the converter has
/// no writing capability.
pub(crate) fn write_converted<T: Recordable>(
    converter: &str,
    caps: &Capabilities<T>,
    value: &T,
    node: &mut Element,
    cx: &mut WriteContext<'_>,
) -> bool {
    if let Some(to_text) = &caps.to_text {
        match to_text(value) {
            Ok(text) => node.set_text(text),
            Err(err) => cx.exception(format!("converter `{converter}` failed: {err}")),
        }
        return true;
    }

    if let Some(record) = &caps.record {
        let mut copy = (record.snapshot)(value);
        let mut recorder = Recorder::Write(FieldWriter::new(node, cx));
        let result = (record.record)(&mut copy, &mut recorder);
        if let Err(err) = result {
            cx.exception(format!("converter `{converter}` failed: {err}"));
        }
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::{Capabilities, CapabilityFlags, Converter, ConverterError, ConverterRegistry};

    #[test]
    fn overlapping_claims_keep_the_first() {
        let mut registry = ConverterRegistry::new();
        let first = Converter::new("first").with(Capabilities::<u8>::new().from_text(|_| Ok(Some(1))));
        let second = Converter::new("second")
            .with(Capabilities::<u8>::new().from_text(|_| Ok(Some(2))))
            .with(Capabilities::<u16>::new().to_text(|v| Ok(v.to_string())));

        assert!(registry.register(first).is_empty());
        let errors = registry.register(second);
        assert_eq!(
            errors,
            [ConverterError::Overlap {
                converter: "second".into(),
                ty: "u8",
                existing: "first".into(),
            }]
        );

        assert_eq!(registry.converter_name(core::any::TypeId::of::<u8>()), Some("first"));
        assert_eq!(
            registry.flags(core::any::TypeId::of::<u16>()),
            Some(CapabilityFlags::TO_TEXT)
        );
        let caps = registry.get::<u8>().unwrap();
        assert_eq!(caps.flags(), CapabilityFlags::FROM_TEXT);
    }

    #[test]
    fn empty_converter() {
        let mut registry = ConverterRegistry::new();
        assert_eq!(
            registry.register(Converter::new("nothing")),
            [ConverterError::Empty("nothing".into())]
        );

        let errors = registry.register(Converter::new("blank").with(Capabilities::<u8>::new()));
        assert!(matches!(errors[..], [ConverterError::NoCapability { ty: "u8", .. }]));
        assert!(registry.get::<u8>().is_none());
    }
}
