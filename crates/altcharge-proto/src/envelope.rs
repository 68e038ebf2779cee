//! Envelope (header) handling.
//!
//! Frames arrive either as a bare header or wrapped once more as
//! `{ 1: header }`. The header carries the payload sub-message in field 1,
//! routing metadata, and the sequence number in field 14.

use altcharge_wire::{WireError, WireReader, WireValue};
use serde::Serialize;

/// Header field numbers.
pub mod field {
    pub const PDATA: u32 = 1;
    pub const SRC: u32 = 2;
    pub const DEST: u32 = 3;
    pub const D_SRC: u32 = 4;
    pub const D_DEST: u32 = 5;
    pub const ENC_TYPE: u32 = 6;
    pub const CHECK_TYPE: u32 = 7;
    pub const CMD_FUNC: u32 = 8;
    pub const CMD_ID: u32 = 9;
    pub const DATA_LEN: u32 = 10;
    pub const NEED_ACK: u32 = 11;
    pub const IS_ACK: u32 = 12;
    pub const SEQ: u32 = 14;
    pub const PRODUCT_ID: u32 = 15;
    pub const VERSION: u32 = 16;
    pub const PAYLOAD_VER: u32 = 17;
    pub const FROM: u32 = 23;
}

/// Outer message field holding the header.
pub const OUTER_HEADER_FIELD: u32 = 1;

/// The parts of a frame the decoder needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope<'a> {
    /// The header scope these fields were read from.
    pub header: &'a [u8],
    /// Field 14, if present.
    pub sequence_number: Option<u64>,
    /// Field 1 as a length-delimited sub-message, if present.
    pub payload: Option<&'a [u8]>,
    /// The structural error that ended the header walk early, if any.
    pub error: Option<WireError>,
}

impl<'a> Envelope<'a> {
    /// Find the header in `frame` and pull out sequence number and payload.
    ///
    /// A frame without a sequence number at the top level is tried as the
    /// `{ 1: header }` wrapper. If neither level has one, the top-level view
    /// is returned.
    pub fn locate(frame: &'a [u8]) -> Self {
        let top = Self::scan(frame);
        if top.sequence_number.is_some() {
            return top;
        }

        if let Some(inner) = top.payload {
            let header = Self::scan(inner);
            if header.sequence_number.is_some() {
                return header;
            }
        }

        top
    }

    /// Walk one message scope, keeping field 14 and field 1.
    ///
    /// Stops at the first structural error; later occurrences of a field
    /// replace earlier ones.
    pub fn scan(header: &'a [u8]) -> Self {
        let mut envelope = Envelope {
            header,
            sequence_number: None,
            payload: None,
            error: None,
        };

        for item in WireReader::new(header) {
            match item {
                Ok(wire) => match (wire.number, wire.value) {
                    (field::SEQ, WireValue::Varint(seq)) => envelope.sequence_number = Some(seq),
                    (field::PDATA, WireValue::LengthDelimited(bytes)) => {
                        envelope.payload = Some(bytes)
                    }
                    _ => {}
                },
                Err(err) => {
                    envelope.error = Some(err);
                    break;
                }
            }
        }

        envelope
    }
}

/// Every documented header field, for inspection tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvelopeHeader {
    pub src: Option<u64>,
    pub dest: Option<u64>,
    pub d_src: Option<u64>,
    pub d_dest: Option<u64>,
    pub enc_type: Option<u64>,
    pub check_type: Option<u64>,
    pub cmd_func: Option<u64>,
    pub cmd_id: Option<u64>,
    pub data_len: Option<u64>,
    pub need_ack: Option<u64>,
    pub is_ack: Option<u64>,
    pub seq: Option<u64>,
    pub product_id: Option<u64>,
    pub version: Option<u64>,
    pub payload_ver: Option<u64>,
    pub from: Option<String>,
    /// Length in bytes of the payload sub-message.
    pub pdata_len: Option<usize>,
}

impl EnvelopeHeader {
    /// Parse a header scope. Parsing stops quietly at the first structural
    /// error; fields read before it are kept.
    pub fn parse(header: &[u8]) -> Self {
        let mut out = EnvelopeHeader::default();

        for wire in WireReader::new(header).map_while(Result::ok) {
            match wire.value {
                WireValue::Varint(value) => {
                    let slot = match wire.number {
                        field::SRC => &mut out.src,
                        field::DEST => &mut out.dest,
                        field::D_SRC => &mut out.d_src,
                        field::D_DEST => &mut out.d_dest,
                        field::ENC_TYPE => &mut out.enc_type,
                        field::CHECK_TYPE => &mut out.check_type,
                        field::CMD_FUNC => &mut out.cmd_func,
                        field::CMD_ID => &mut out.cmd_id,
                        field::DATA_LEN => &mut out.data_len,
                        field::NEED_ACK => &mut out.need_ack,
                        field::IS_ACK => &mut out.is_ack,
                        field::SEQ => &mut out.seq,
                        field::PRODUCT_ID => &mut out.product_id,
                        field::VERSION => &mut out.version,
                        field::PAYLOAD_VER => &mut out.payload_ver,
                        _ => continue,
                    };
                    *slot = Some(value);
                }
                WireValue::LengthDelimited(bytes) if wire.number == field::PDATA => {
                    out.pdata_len = Some(bytes.len());
                }
                WireValue::LengthDelimited(bytes) if wire.number == field::FROM => {
                    out.from = Some(String::from_utf8_lossy(bytes).into_owned());
                }
                _ => {}
            }
        }

        out
    }
}
