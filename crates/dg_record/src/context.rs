use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use dg_def::{Database, ErasedShared, IndexRegistry, ptr_key};
use dg_schema::registry::TypeRegistry;
use dg_utils::hash::{HashMap, HashSet};

use crate::xml::Element;
use crate::{Config, ConverterRegistry, Diagnostics, Location};

// -----------------------------------------------------------------------------
// FieldPath

#[derive(Debug, Clone, Copy)]
enum PathSegment {
    Field(&'static str),
    Item(usize),
}

/// Position inside the value being read or written, for diagnostics.
#[derive(Debug, Default)]
pub(crate) struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    fn render(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => {
                    f.write_char('.')?;
                    f.write_str(name)?;
                }
                PathSegment::Item(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// RefTable

/// Objects of a record's `refs` section, by id.
#[derive(Default)]
pub(crate) struct RefTable {
    entries: HashMap<String, (ErasedShared, &'static str)>,
}

impl RefTable {
    /// Returns `false` if `id` is taken.
    pub fn insert(&mut self, id: String, handle: ErasedShared, type_name: &'static str) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, (handle, type_name));
        true
    }

    pub fn get(&self, id: &str) -> Option<&(ErasedShared, &'static str)> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// -----------------------------------------------------------------------------
// ReadContext

/// Everything a value needs while it is read.
///
/// Passed to [`Recordable::read`](crate::Recordable::read) and to user
/// converters through [`FieldReader`](crate::FieldReader).
pub struct ReadContext<'a> {
    config: &'a Config,
    registry: &'a TypeRegistry,
    converters: &'a ConverterRegistry,
    database: &'a Database,
    indices: &'a mut IndexRegistry,
    diagnostics: &'a mut Diagnostics,
    refs: Option<&'a RefTable>,
    source: Option<&'a str>,
    path: FieldPath,
}

impl<'a> ReadContext<'a> {
    #[expect(clippy::too_many_arguments, reason = "split borrows of a session")]
    pub(crate) fn new(
        config: &'a Config,
        registry: &'a TypeRegistry,
        converters: &'a ConverterRegistry,
        database: &'a Database,
        indices: &'a mut IndexRegistry,
        diagnostics: &'a mut Diagnostics,
        refs: Option<&'a RefTable>,
        source: Option<&'a str>,
    ) -> Self {
        Self {
            config,
            registry,
            converters,
            database,
            indices,
            diagnostics,
            refs,
            source,
            path: FieldPath::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn converters(&self) -> &'a ConverterRegistry {
        self.converters
    }

    #[inline]
    pub fn database(&self) -> &'a Database {
        self.database
    }

    #[inline]
    pub fn indices(&mut self) -> &mut IndexRegistry {
        self.indices
    }

    /// `true` while reading a record, where shared objects may cite `refs`.
    #[inline]
    pub fn is_record(&self) -> bool {
        self.refs.is_some()
    }

    #[inline]
    pub(crate) fn refs(&self) -> Option<&'a RefTable> {
        self.refs
    }

    pub fn location(&self, node: &Element) -> Location {
        Location {
            source: self.source.map(ToString::to_string),
            line: (node.line() > 0).then_some(node.line()),
            path: self.path.render(),
        }
    }

    pub fn warning(&mut self, node: &Element, message: impl Into<String>) {
        let location = self.location(node);
        self.diagnostics.warning(message, location);
    }

    pub fn error(&mut self, node: &Element, message: impl Into<String>) {
        let location = self.location(node);
        self.diagnostics.error(message, location);
    }

    pub fn exception(&mut self, node: &Element, message: impl Into<String>) {
        let location = self.location(node);
        self.diagnostics.exception(message, location);
    }

    #[inline]
    pub(crate) fn push_field(&mut self, name: &'static str) {
        self.path.0.push(PathSegment::Field(name));
    }

    #[inline]
    pub(crate) fn push_item(&mut self, index: usize) {
        self.path.0.push(PathSegment::Item(index));
    }

    #[inline]
    pub(crate) fn pop_path(&mut self) {
        self.path.0.pop();
    }

    /// Reports attributes nobody consumed.
    pub(crate) fn report_unused_attributes(&mut self, node: &mut Element) {
        for (name, value) in node.take_attributes() {
            self.error(node, format!("unknown attribute {name}=\"{value}\""));
        }
    }
}

// -----------------------------------------------------------------------------
// WriteContext

/// Writes the body of a queued shared object.
pub(crate) type WriteShared = fn(&ErasedShared, &mut Element, &mut WriteContext<'_>);

pub(crate) struct PendingRef {
    pub id: String,
    pub class: &'static str,
    pub handle: ErasedShared,
    pub write: WriteShared,
}

/// Shared objects discovered while writing a record.
#[derive(Default)]
pub(crate) struct RefQueue {
    ids: HashMap<usize, String>,
    pending: VecDeque<PendingRef>,
}

impl RefQueue {
    /// Returns the id of `handle`, queueing it on first sight.
    pub fn reserve(&mut self, handle: ErasedShared, class: &'static str, write: WriteShared) -> String {
        let key = ptr_key(&handle);
        if let Some(id) = self.ids.get(&key) {
            return id.clone();
        }

        let id = format!("ref{:02}", self.ids.len());
        self.ids.insert(key, id.clone());
        self.pending.push_back(PendingRef {
            id: id.clone(),
            class,
            handle,
            write,
        });
        id
    }

    pub fn pop(&mut self) -> Option<PendingRef> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

pub(crate) enum WriteMode {
    /// Shared objects go to the `refs` table.
    Record(RefQueue),
    /// Shared objects are written in place; `active` holds the objects being
    /// written.
    Compose { active: HashSet<usize> },
}

/// Everything a value needs while it is written.
pub struct WriteContext<'a> {
    config: &'a Config,
    converters: &'a ConverterRegistry,
    database: &'a Database,
    diagnostics: &'a mut Diagnostics,
    mode: WriteMode,
    path: FieldPath,
}

impl<'a> WriteContext<'a> {
    pub(crate) fn new(
        config: &'a Config,
        converters: &'a ConverterRegistry,
        database: &'a Database,
        diagnostics: &'a mut Diagnostics,
        mode: WriteMode,
    ) -> Self {
        Self {
            config,
            converters,
            database,
            diagnostics,
            mode,
            path: FieldPath::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[inline]
    pub fn converters(&self) -> &'a ConverterRegistry {
        self.converters
    }

    #[inline]
    pub fn database(&self) -> &'a Database {
        self.database
    }

    #[inline]
    pub fn is_record(&self) -> bool {
        matches!(self.mode, WriteMode::Record(_))
    }

    #[inline]
    pub(crate) fn mode_mut(&mut self) -> &mut WriteMode {
        &mut self.mode
    }

    pub(crate) fn into_mode(self) -> WriteMode {
        self.mode
    }

    pub fn location(&self) -> Location {
        Location {
            path: self.path.render(),
            ..Location::default()
        }
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let location = self.location();
        self.diagnostics.warning(message, location);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let location = self.location();
        self.diagnostics.error(message, location);
    }

    pub fn exception(&mut self, message: impl Into<String>) {
        let location = self.location();
        self.diagnostics.exception(message, location);
    }

    #[inline]
    pub(crate) fn push_field(&mut self, name: &'static str) {
        self.path.0.push(PathSegment::Field(name));
    }

    #[inline]
    pub(crate) fn push_item(&mut self, index: usize) {
        self.path.0.push(PathSegment::Item(index));
    }

    #[inline]
    pub(crate) fn pop_path(&mut self) {
        self.path.0.pop();
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{FieldPath, PathSegment};

    #[test]
    fn path_rendering() {
        let path = FieldPath(alloc::vec![
            PathSegment::Field("items"),
            PathSegment::Item(2),
            PathSegment::Field("name"),
        ]);
        assert_eq!(path.to_string(), "items[2].name");
        assert_eq!(FieldPath::default().render(), None);
    }
}
