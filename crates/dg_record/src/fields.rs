use alloc::format;
use alloc::vec::Vec;

use fixedbitset::FixedBitSet;

use crate::recordable::{read_value, write_value};
use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

// -----------------------------------------------------------------------------
// FieldReader

/// Reads labelled fields out of one composite element.
///
/// Every child element must be claimed by exactly one field; whatever is left
/// when the reader is [finished](Self::finish) is reported as unknown.
pub struct FieldReader<'r, 'a> {
    node: &'r mut Element,
    cx: &'r mut ReadContext<'a>,
    owner: &'static str,
    claimed: FixedBitSet,
    seen: Vec<&'static str>,
}

impl<'r, 'a> FieldReader<'r, 'a> {
    #[doc(hidden)]
    pub fn new(node: &'r mut Element, cx: &'r mut ReadContext<'a>, owner: &'static str) -> Self {
        let claimed = FixedBitSet::with_capacity(node.children().len());
        Self {
            node,
            cx,
            owner,
            claimed,
            seen: Vec::new(),
        }
    }

    #[inline]
    pub fn context(&mut self) -> &mut ReadContext<'a> {
        self.cx
    }

    /// Reads the child labelled `label` into `slot`.
    ///
    /// An absent child leaves `slot` untouched. When the label occurs more
    /// than once, the last occurrence wins. A label that a more derived type
    /// already read is shadowed and skipped.
    pub fn read<V: Recordable>(&mut self, slot: &mut V, label: &'static str) {
        if self.seen.contains(&label) {
            return;
        }
        self.seen.push(label);

        let mut last = None;
        let mut count = 0_usize;
        for (index, child) in self.node.children().iter().enumerate() {
            if child.name() == label {
                self.claimed.insert(index);
                last = Some(index);
                count += 1;
            }
        }

        let Some(index) = last else {
            return;
        };

        let child = &mut self.node.children_mut()[index];
        if count > 1 {
            self.cx.error(
                child,
                format!("duplicate field `{label}` in {}; keeping the last", self.owner),
            );
        }

        self.cx.push_field(label);
        read_value(slot, child, self.cx);
        self.cx.pop_path();
    }

    /// Reports unclaimed children and stray text.
    pub fn finish(self) {
        for (index, child) in self.node.children().iter().enumerate() {
            if !self.claimed.contains(index) {
                self.cx.error(
                    child,
                    format!("unknown field `{}` in {}", child.name(), self.owner),
                );
            }
        }
        if self.node.has_text() {
            self.cx
                .error(self.node, format!("{} cannot contain text", self.owner));
        }
    }
}

// -----------------------------------------------------------------------------
// FieldWriter

/// Writes labelled fields as children of one composite element.
pub struct FieldWriter<'w, 'a> {
    node: &'w mut Element,
    cx: &'w mut WriteContext<'a>,
    written: Vec<&'static str>,
}

impl<'w, 'a> FieldWriter<'w, 'a> {
    #[doc(hidden)]
    pub fn new(node: &'w mut Element, cx: &'w mut WriteContext<'a>) -> Self {
        Self {
            node,
            cx,
            written: Vec::new(),
        }
    }

    #[inline]
    pub fn context(&mut self) -> &mut WriteContext<'a> {
        self.cx
    }

    /// Writes `value` as the child `label`. A label already written by a more
    /// derived type is skipped.
    pub fn write<V: Recordable>(&mut self, value: &V, label: &'static str) {
        if self.written.contains(&label) {
            return;
        }
        self.written.push(label);

        let mut child = Element::new(label);
        self.cx.push_field(label);
        write_value(value, &mut child, self.cx);
        self.cx.pop_path();
        self.node.push_child(child);
    }
}

// -----------------------------------------------------------------------------
// Recorder

/// One field visitor for both directions, used by `record` converters.
///
/// # Examples
///
/// ```
/// use dg_record::{Capabilities, Recorder};
///
/// #[derive(Clone, Default)]
/// struct Range {
///     low: i32,
///     high: i32,
/// }
///
/// let caps = Capabilities::<Range>::new().record(|range, recorder: &mut Recorder<'_, '_>| {
///     recorder.record(&mut range.low, "low");
///     recorder.record(&mut range.high, "high");
///     Ok(())
/// });
/// # let _ = caps;
/// ```
pub enum Recorder<'r, 'a> {
    Read(FieldReader<'r, 'a>),
    Write(FieldWriter<'r, 'a>),
}

impl Recorder<'_, '_> {
    /// Reads or writes `value` as the field `label`.
    pub fn record<V: Recordable>(&mut self, value: &mut V, label: &'static str) {
        match self {
            Self::Read(reader) => reader.read(value, label),
            Self::Write(writer) => writer.write(value, label),
        }
    }

    #[inline]
    pub fn is_reading(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}
