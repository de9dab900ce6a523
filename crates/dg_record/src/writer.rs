use alloc::string::{String, ToString};

use dg_schema::registry::GetTypeMeta;

use crate::context::{RefQueue, WriteMode};
use crate::xml::{Element, write_document};
use crate::{Recordable, Session, SessionError, WriteContext, write_value};

/// Tag of the format version inside a record.
pub(crate) const VERSION_TAG: &str = "recordFormatVersion";
/// Tag of the reference table inside a record.
pub(crate) const REFS_TAG: &str = "refs";
/// Tag of the value inside a record.
pub(crate) const DATA_TAG: &str = "data";

impl Session {
    /// Writes `value` as a record document.
    ///
    /// Every non-def shared object reachable from `value` is written once, in
    /// the `refs` table, in the order it was first met; positions holding it
    /// cite its id. Defs are written by name.
    ///
    /// Problems are reported to the diagnostics; the returned error is only
    /// about producing the document text.
    pub fn write_record<T: Recordable + GetTypeMeta>(&mut self, value: &T) -> Result<String, SessionError> {
        self.ensure_registered::<T>();
        let root = self.record_element(value);
        Ok(write_document(&root, self.config.indent())?)
    }

    fn record_element<T: Recordable>(&mut self, value: &T) -> Element {
        let config = &self.config;
        let mut cx = WriteContext::new(
            config,
            &self.converters,
            &self.database,
            &mut self.diagnostics,
            WriteMode::Record(RefQueue::default()),
        );

        let mut data = Element::new(DATA_TAG);
        write_value(value, &mut data, &mut cx);

        let mut refs = Element::new(REFS_TAG);
        loop {
            let next = match cx.mode_mut() {
                WriteMode::Record(queue) => queue.pop(),
                WriteMode::Compose { .. } => None,
            };
            let Some(pending) = next else {
                break;
            };

            let mut entry = Element::new(config.ref_tag())
                .with_attribute(config.ref_id_attribute(), pending.id)
                .with_attribute(config.ref_class_attribute(), pending.class);
            (pending.write)(&pending.handle, &mut entry, &mut cx);
            refs.push_child(entry);
        }

        if let WriteMode::Record(queue) = cx.into_mode() {
            log::trace!("record holds {} shared objects", queue.len());
        }

        Element::new(config.record_root())
            .with_child(Element::new(VERSION_TAG).with_text(config.format_version().to_string()))
            .with_child(refs)
            .with_child(data)
    }
}
