//! Schema-less tag/varint wire grammar.
//!
//! The charger speaks a protobuf-style format whose schema is not published.
//! This crate walks and builds buffers of that grammar without any knowledge
//! of field meaning:
//! - a tag varint carrying `field_number << 3 | wire_type`
//! - varint, 8-byte fixed, length-delimited and 4-byte fixed values
//!
//! Field semantics live one layer up, in `altcharge-proto`.

pub mod error;
pub mod reader;
pub mod types;
pub mod writer;

pub use error::{Result, WireError};
pub use reader::WireReader;
pub use types::{WireField, WireType, WireValue, MAX_FIELD_NUMBER};
pub use writer::{encode_varint, varint_len, WireWriter};
