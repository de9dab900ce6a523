use alloc::format;
use alloc::string::{String, ToString};
use std::path::Path;

use dg_schema::SchemaKind;
use dg_schema::info::CompositeInfo;

use crate::classify::{Classification, classify};
use crate::session::PendingDef;
use crate::xml::{Element, parse_document};
use crate::{Location, Phase, Session, SessionError, TypeTraitRecord};

fn location(source: Option<&str>, node: &Element) -> Location {
    Location {
        source: source.map(ToString::to_string),
        line: (node.line() > 0).then_some(node.line()),
        path: None,
    }
}

impl Session {
    /// Adds a `Defs` document. Every def in it is registered right away and
    /// populated by [`finish`](Self::finish).
    pub fn add_string(&mut self, text: &str) {
        self.add_document(text, None);
    }

    /// Like [`add_string`](Self::add_string); diagnostics name `source`.
    pub fn add_source(&mut self, text: &str, source: &str) {
        self.add_document(text, Some(source));
    }

    /// Reads and adds the `Defs` document at `path`.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_source(&text, &path.display().to_string());
        Ok(())
    }

    /// Adds one document and finishes the session.
    pub fn parse_from_string(&mut self, text: &str) {
        self.add_string(text);
        self.finish();
    }

    fn add_document(&mut self, text: &str, source: Option<&str>) {
        match self.phase {
            Phase::Uninitialized => self.phase = Phase::Accumulating,
            Phase::Accumulating => {}
            Phase::Processing | Phase::Finished => {
                self.diagnostics.error(
                    "documents cannot be added after finish",
                    Location {
                        source: source.map(ToString::to_string),
                        ..Location::default()
                    },
                );
                return;
            }
        }

        let mut root = match parse_document(text) {
            Ok(root) => root,
            Err(err) => {
                self.diagnostics.error(
                    format!("{err}"),
                    Location {
                        source: source.map(ToString::to_string),
                        ..Location::default()
                    },
                );
                return;
            }
        };

        if root.name() != self.config.defs_root() {
            self.diagnostics.warning(
                format!("root is <{}>, expected <{}>", root.name(), self.config.defs_root()),
                location(source, &root),
            );
        }
        if root.has_text() {
            self.diagnostics
                .error("text outside of any def is ignored", location(source, &root));
        }

        let mut added = 0_usize;
        for element in root.take_children() {
            if self.register_def(element, source) {
                added += 1;
            }
        }
        log::debug!(
            "registered {added} defs from {}",
            source.unwrap_or("a string")
        );
    }

    // Registers the def declared by `element` and queues it for population.
    fn register_def(&mut self, mut element: Element, source: Option<&str>) -> bool {
        let tag = element.name().to_string();
        let Some(meta) = self.registry.get_with_type_name(&tag) else {
            let message = if self.registry.is_ambiguous(&tag) {
                format!("def type name `{tag}` is ambiguous")
            } else {
                format!("unknown def type `{tag}`")
            };
            self.diagnostics.error(message, location(source, &element));
            return false;
        };

        let info = match classify(meta.schema(), &self.converters) {
            Classification::Schema(SchemaKind::Composite) => meta.schema().as_composite().ok(),
            _ => None,
        };
        let (Some(root), Some(record)) = (
            info.and_then(CompositeInfo::def_root),
            meta.get_trait::<TypeTraitRecord>().copied(),
        ) else {
            self.diagnostics.error(
                format!("`{tag}` is not a def type"),
                location(source, &element),
            );
            return false;
        };
        let type_id = meta.type_id();

        let Some(name) = element.take_attribute(self.config.def_name_attribute()) else {
            self.diagnostics.error(
                format!(
                    "`{tag}` has no `{}` attribute",
                    self.config.def_name_attribute()
                ),
                location(source, &element),
            );
            return false;
        };

        let handle = record.create_shared();
        if let Err(err) = self.database.insert_erased(root, type_id, &name, handle.clone()) {
            self.diagnostics
                .error(format!("{err}"), location(source, &element));
            return false;
        }
        record.assign_indices(&handle, &mut self.indices);

        self.pending.push(PendingDef {
            handle,
            record,
            element,
            source: source.map(String::from),
        });
        true
    }

    /// Populates every added def.
    ///
    /// Calling it before any document was added, or more than once, is
    /// reported and changes nothing.
    pub fn finish(&mut self) {
        match self.phase {
            Phase::Accumulating => {}
            Phase::Uninitialized => {
                self.diagnostics
                    .error("finish called before any document was added", Location::default());
                return;
            }
            Phase::Processing | Phase::Finished => {
                self.diagnostics
                    .error("finish called more than once", Location::default());
                return;
            }
        }

        self.phase = Phase::Processing;
        let pending = core::mem::take(&mut self.pending);
        let count = pending.len();
        for PendingDef {
            handle,
            record,
            mut element,
            source,
        } in pending
        {
            let mut cx = self.read_context(None, source.as_deref());
            record.populate(&handle, &mut element, &mut cx);
        }
        self.phase = Phase::Finished;
        log::debug!("populated {count} defs");
    }
}
