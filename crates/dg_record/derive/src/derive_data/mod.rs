//! Provide some tools for parsing token stream.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod record_enum;
mod record_meta;
mod record_struct;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};

pub(crate) use record_enum::RecordEnum;
pub(crate) use record_meta::RecordMeta;
pub(crate) use record_struct::RecordStruct;
