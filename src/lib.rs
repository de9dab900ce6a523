#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use dg_def as def;
pub use dg_record as record;
pub use dg_schema as schema;
pub use dg_utils as utils;
