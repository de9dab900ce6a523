use alloc::format;

use dg_def::{ErasedShared, IndexRegistry};
use dg_schema::Typed;

use crate::converter::{read_converted, write_converted};
use crate::fields::{FieldReader, FieldWriter};
use crate::xml::Element;
use crate::{ReadContext, WriteContext};

// -----------------------------------------------------------------------------
// Recordable

/// A type that can be read from and written to an [`Element`].
///
/// Implemented for leaves, strings, collections, `Option`, shared handles and
/// every `#[derive(Recordable)]` type. Values are read in place: a field whose
/// element is absent keeps what [`create`](Self::create) or the caller put
/// there.
///
/// Problems never abort a read. They are reported through the context and
/// the value falls back as documented on each implementation.
pub trait Recordable: Typed + Sized {
    /// The value of a position that was never written.
    fn create() -> Self;

    /// Overwrites `self` from the content of `node`.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>);

    /// Writes `self` as the content of `node`.
    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>);

    /// Reads a fresh value. `None` means the position stays empty, which only
    /// happens after an error.
    fn read_new(node: &mut Element, cx: &mut ReadContext<'_>) -> Option<Self> {
        let mut value = Self::create();
        value.read(node, cx);
        Some(value)
    }

    /// Reads into a nullable slot.
    fn read_optional(slot: &mut Option<Self>, node: &mut Element, cx: &mut ReadContext<'_>) {
        match slot {
            Some(value) => value.read(node, cx),
            None => *slot = Self::read_new(node, cx),
        }
    }

    /// The null value, for nullable types.
    #[inline]
    fn null() -> Option<Self> {
        None
    }

    /// Makes `self` null. Returns `false` for non-nullable types.
    #[inline]
    fn set_null(&mut self) -> bool {
        false
    }

    #[inline]
    fn is_null(&self) -> bool {
        false
    }

    /// Indexes a value that was just read in a value position.
    #[inline]
    fn index_value(&mut self, _cx: &mut ReadContext<'_>) {}

    /// Indexes the object behind `handle`, whose content is `self`.
    #[inline]
    fn assign_indices(&mut self, _handle: &ErasedShared, _indices: &mut IndexRegistry) {}
}

/// Field access of a composite, generated by `#[derive(Recordable)]`.
///
/// Own fields are visited first, then the fields of the embedded base.
pub trait RecordFields {
    fn read_fields(&mut self, reader: &mut FieldReader<'_, '_>);

    fn write_fields(&self, writer: &mut FieldWriter<'_, '_>);
}

// -----------------------------------------------------------------------------
// Drivers

/// Reads `node` into `slot`, honoring the null marker, converters and
/// attribute bookkeeping.
pub fn read_value<T: Recordable>(slot: &mut T, node: &mut Element, cx: &mut ReadContext<'_>) {
    if take_null_marker(node, cx) {
        if !slot.set_null() {
            cx.error(node, format!("{} cannot be null", T::type_name()));
        }
    } else {
        read_body(slot, node, cx);
        slot.index_value(cx);
    }
    cx.report_unused_attributes(node);
}

/// Reads one collection item.
pub(crate) fn read_item<T: Recordable>(node: &mut Element, cx: &mut ReadContext<'_>) -> Option<T> {
    let item = if take_null_marker(node, cx) {
        T::null().or_else(|| {
            cx.error(node, format!("{} cannot be null", T::type_name()));
            Some(T::create())
        })
    } else {
        let item = match cx.converters().lookup::<T>() {
            Some((name, caps)) => read_converted(name, caps, Some(T::create()), false, node, cx),
            None => T::read_new(node, cx),
        };
        item.map(|mut item| {
            item.index_value(cx);
            item
        })
    };
    cx.report_unused_attributes(node);
    item
}

/// Reads the content of `node` into `slot`, ignoring the null marker.
pub(crate) fn read_body<T: Recordable>(slot: &mut T, node: &mut Element, cx: &mut ReadContext<'_>) {
    match cx.converters().lookup::<T>() {
        Some((name, caps)) => {
            let model = core::mem::replace(slot, T::create());
            if let Some(value) = read_converted(name, caps, Some(model), false, node, cx) {
                *slot = value;
            }
        }
        None => slot.read(node, cx),
    }
}

// `true` if the node is marked null. A marker other than `true` is reported
// and ignored.
fn take_null_marker(node: &mut Element, cx: &mut ReadContext<'_>) -> bool {
    let Some(marker) = node.take_attribute(cx.config().null_attribute()) else {
        return false;
    };
    if marker.trim() == "true" {
        return true;
    }
    cx.error(node, format!("invalid null marker \"{marker}\""));
    false
}

/// Writes `value` into `node`, emitting the null marker for null values.
pub fn write_value<T: Recordable>(value: &T, node: &mut Element, cx: &mut WriteContext<'_>) {
    if value.is_null() {
        node.set_attribute(cx.config().null_attribute(), "true");
    } else {
        write_body(value, node, cx);
    }
}

/// Writes the content of `value`, through its converter if one is registered.
pub(crate) fn write_body<T: Recordable>(value: &T, node: &mut Element, cx: &mut WriteContext<'_>) {
    if let Some((name, caps)) = cx.converters().lookup::<T>()
        && write_converted(name, caps, value, node, cx)
    {
        return;
    }
    value.write(node, cx);
}
