#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

extern crate alloc;

// Generated code names items through `::dg_record`.
extern crate self as dg_record;

// -----------------------------------------------------------------------------
// Modules

mod classify;
mod composer;
mod config;
mod context;
mod converter;
mod diagnostics;
mod error;
mod fields;
mod impls;
mod parser;
mod reader;
mod recordable;
mod session;
mod traits;
mod writer;

pub mod xml;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-level exports

pub use classify::{Classification, classify, classify_type};
pub use config::Config;
pub use context::{ReadContext, WriteContext};
pub use converter::{Capabilities, CapabilityFlags, ConvertError, Converter, ConverterError};
pub use converter::ConverterRegistry;
pub use diagnostics::{CollectSink, Diagnostic, DiagnosticSink, Diagnostics, Location, LogSink};
pub use diagnostics::Severity;
pub use error::SessionError;
pub use fields::{FieldReader, FieldWriter, Recorder};
pub use recordable::{RecordFields, Recordable, read_value, write_value};
pub use session::{Phase, Session};
pub use traits::TypeTraitRecord;

pub use dg_def::{Database, Def, ErasedShared, IndexRegistry, Shared};
pub use dg_record_derive::Recordable;
