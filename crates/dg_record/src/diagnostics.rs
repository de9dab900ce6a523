use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

// -----------------------------------------------------------------------------
// Severity

/// How bad a reported problem is.
///
/// None of them stop a load; they only describe what the fallback was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
    /// A user converter failed.
    Exception,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.pad("warning"),
            Self::Error => f.pad("error"),
            Self::Exception => f.pad("exception"),
        }
    }
}

// -----------------------------------------------------------------------------
// Location

/// Where a problem was found. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Name of the input, as given to `add_source`.
    pub source: Option<String>,
    /// 1-based line of the element.
    pub line: Option<u32>,
    /// Field path from the entity root, e.g. `items[2].name`.
    pub path: Option<String>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.line.is_none() && self.path.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.line) {
            (Some(source), Some(line)) => write!(f, "{source}:{line}")?,
            (Some(source), None) => f.write_str(source)?,
            (None, Some(line)) => write!(f, "line {line}")?,
            (None, None) => {}
        }
        if let Some(path) = &self.path {
            if self.source.is_some() || self.line.is_some() {
                f.write_str(" ")?;
            }
            write!(f, "({path})")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Diagnostic

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity, self.location, self.message)
        }
    }
}

// -----------------------------------------------------------------------------
// Sinks

/// Receives every diagnostic as it is reported.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        let Diagnostic {
            severity,
            message,
            location,
        } = diagnostic;
        match severity {
            Severity::Warning if location.is_empty() => log::warn!("{message}"),
            Severity::Warning => log::warn!("{location}: {message}"),
            _ if location.is_empty() => log::error!("{message}"),
            _ => log::error!("{location}: {message}"),
        }
    }
}

/// Keeps a copy of every diagnostic; clones share the same list.
///
/// ```
/// use dg_record::{CollectSink, Session};
///
/// let sink = CollectSink::new();
/// let mut session = Session::new();
/// session.set_sink(sink.clone());
///
/// session.finish();
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectSink(Rc<RefCell<Vec<Diagnostic>>>);

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl DiagnosticSink for CollectSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.0.borrow_mut().push(diagnostic.clone());
    }
}

// -----------------------------------------------------------------------------
// Diagnostics

/// The diagnostic channel of a session: a sink plus the history since the
/// last [`take`](Self::take).
pub struct Diagnostics {
    sink: Box<dyn DiagnosticSink>,
    history: Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Diagnostics {
    /// Reports through [`LogSink`].
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }

    pub fn with_sink(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            history: Vec::new(),
        }
    }

    pub fn set_sink(&mut self, sink: impl DiagnosticSink + 'static) {
        self.sink = Box::new(sink);
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(&diagnostic);
        self.history.push(diagnostic);
    }

    pub fn warning(&mut self, message: impl Into<String>, location: Location) {
        self.push(Severity::Warning, message.into(), location);
    }

    pub fn error(&mut self, message: impl Into<String>, location: Location) {
        self.push(Severity::Error, message.into(), location);
    }

    pub fn exception(&mut self, message: impl Into<String>, location: Location) {
        self.push(Severity::Exception, message.into(), location);
    }

    #[inline]
    fn push(&mut self, severity: Severity, message: String, location: Location) {
        self.report(Diagnostic {
            severity,
            message,
            location,
        });
    }

    /// Errors and exceptions reported since the last [`take`](Self::take).
    pub fn error_count(&self) -> usize {
        self.history
            .iter()
            .filter(|diagnostic| diagnostic.severity >= Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.history
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
            .count()
    }

    #[inline]
    pub fn history(&self) -> &[Diagnostic] {
        &self.history
    }

    /// Drains the history.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.history)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{CollectSink, Diagnostics, Location, Severity};

    #[test]
    fn counters_and_take() {
        let sink = CollectSink::new();
        let mut diagnostics = Diagnostics::with_sink(sink.clone());
        diagnostics.warning("odd root", Location::default());
        diagnostics.error("bad value", Location::default());
        diagnostics.exception("converter failed", Location::default());

        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.error_count(), 2);
        assert_eq!(sink.len(), 3);

        let taken = diagnostics.take();
        assert_eq!(taken[2].severity, Severity::Exception);
        assert_eq!(diagnostics.error_count(), 0);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn location_display() {
        let full = Location {
            source: Some("items.xml".into()),
            line: Some(12),
            path: Some("tags[1]".into()),
        };
        assert_eq!(full.to_string(), "items.xml:12 (tags[1])");

        let line_only = Location {
            line: Some(3),
            ..Location::default()
        };
        assert_eq!(line_only.to_string(), "line 3");
        assert_eq!(Location::default().to_string(), "");
    }
}
