use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use altcharge_wire::WireWriter;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::envelope::{field, OUTER_HEADER_FIELD};
use crate::error::{EncodeError, Result};
use crate::fields::{FieldMap, ParamEncoding, COMMAND_PARAMS};

/// Fixed header values the charger requires on every write command.
pub mod header {
    pub const SRC: u64 = 32;
    pub const DEST: u64 = 20;
    pub const D_SRC: u64 = 1;
    pub const D_DEST: u64 = 1;
    pub const ENC_TYPE: u64 = 1;
    pub const CHECK_TYPE: u64 = 3;
    pub const CMD_FUNC: u64 = 254;
    pub const CMD_ID: u64 = 17;
    pub const NEED_ACK: u64 = 1;
    pub const VERSION: u64 = 19;
    pub const PAYLOAD_VER: u64 = 1;
    pub const FROM: &str = "Android";
}

/// `data_len` marker when a float parameter is present.
pub const DATA_LEN_FLOAT: u64 = 6;
/// `data_len` marker when `startVoltage` is the only shaped parameter.
pub const DATA_LEN_START_VOLTAGE: u64 = 4;
/// `data_len` marker otherwise.
pub const DATA_LEN_DEFAULT: u64 = 3;

/// A command parameter value as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandValue {
    Int(i64),
    Float(f64),
}

impl CommandValue {
    pub fn as_f64(self) -> f64 {
        match self {
            CommandValue::Int(value) => value as f64,
            CommandValue::Float(value) => value,
        }
    }
}

impl From<i64> for CommandValue {
    fn from(value: i64) -> Self {
        CommandValue::Int(value)
    }
}

impl From<i32> for CommandValue {
    fn from(value: i32) -> Self {
        CommandValue::Int(i64::from(value))
    }
}

impl From<bool> for CommandValue {
    fn from(value: bool) -> Self {
        CommandValue::Int(i64::from(value))
    }
}

impl From<f64> for CommandValue {
    fn from(value: f64) -> Self {
        CommandValue::Float(value)
    }
}

/// Named command parameters.
///
/// Names outside the parameter table (for example the host's `id`) are kept
/// but ignored on encode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandRequest {
    params: BTreeMap<String, CommandValue>,
}

impl CommandRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`CommandRequest::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<CommandValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<CommandValue>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<CommandValue> {
        self.params.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CommandValue)> + '_ {
        self.params.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<K: Into<String>, V: Into<CommandValue>> FromIterator<(K, V)> for CommandRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = CommandRequest::new();
        for (name, value) in iter {
            request.insert(name, value);
        }
        request
    }
}

/// Serializes command requests into write-command frames.
///
/// Frame layout:
/// ```text
/// outer { 1: header {
///     1: pdata { parameter fields }
///     2: src  3: dest  4: d_src  5: d_dest  6: enc_type  7: check_type
///     8: cmd_func  9: cmd_id  10: data_len  11: need_ack  14: seq
///     16: version  17: payload_ver  23: from
/// } }
/// ```
/// The payload is never obfuscated; the charger accepts plaintext commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandEncoder;

impl CommandEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode `request` with the current Unix time in milliseconds as sequence.
    pub fn encode(&self, request: &CommandRequest) -> Result<Bytes> {
        self.encode_with_seq(request, now_unix_millis())
    }

    /// Encode `request` with an explicit sequence number.
    pub fn encode_with_seq(&self, request: &CommandRequest, seq: u64) -> Result<Bytes> {
        let pdata = encode_pdata(request)?;
        let data_len = data_len_marker(request);

        let mut header_msg = WireWriter::new();
        header_msg.put_message_field(field::PDATA, &pdata);
        header_msg.put_varint_field(field::SRC, header::SRC);
        header_msg.put_varint_field(field::DEST, header::DEST);
        header_msg.put_varint_field(field::D_SRC, header::D_SRC);
        header_msg.put_varint_field(field::D_DEST, header::D_DEST);
        header_msg.put_varint_field(field::ENC_TYPE, header::ENC_TYPE);
        header_msg.put_varint_field(field::CHECK_TYPE, header::CHECK_TYPE);
        header_msg.put_varint_field(field::CMD_FUNC, header::CMD_FUNC);
        header_msg.put_varint_field(field::CMD_ID, header::CMD_ID);
        header_msg.put_varint_field(field::DATA_LEN, data_len);
        header_msg.put_varint_field(field::NEED_ACK, header::NEED_ACK);
        header_msg.put_varint_field(field::SEQ, seq);
        header_msg.put_varint_field(field::VERSION, header::VERSION);
        header_msg.put_varint_field(field::PAYLOAD_VER, header::PAYLOAD_VER);
        header_msg.put_str_field(field::FROM, header::FROM);

        let mut outer = WireWriter::new();
        outer.put_message_field(OUTER_HEADER_FIELD, &header_msg);

        debug!(
            params = request.len(),
            pdata_len = pdata.len(),
            data_len,
            seq,
            "encoded command"
        );
        Ok(outer.freeze())
    }
}

/// Encode `params` with the default encoder.
pub fn encode_command(params: &CommandRequest) -> Result<Bytes> {
    CommandEncoder::new().encode(params)
}

/// Serialize the known parameters present in `request`, in table order.
fn encode_pdata(request: &CommandRequest) -> Result<WireWriter> {
    let map = FieldMap::global();
    for (name, _) in request.iter().filter(|(name, _)| map.param(name).is_none()) {
        debug!(name, "ignoring unknown command parameter");
    }

    let mut pdata = WireWriter::new();
    for spec in COMMAND_PARAMS {
        let Some(value) = request.get(spec.name) else {
            continue;
        };
        match spec.encoding {
            ParamEncoding::Varint => {
                let raw = int32_value(spec.name, value)?;
                pdata.put_varint_field(spec.number, raw as u64);
            }
            ParamEncoding::ScaledVarint(factor) => {
                let raw = scaled_int32_value(spec.name, value.as_f64(), factor)?;
                pdata.put_varint_field(spec.number, raw as u64);
            }
            ParamEncoding::Fixed32 => {
                pdata.put_fixed32_float_field(spec.number, float_value(spec.name, value)?);
            }
        }
    }

    Ok(pdata)
}

/// The charger's `data_len` marker. This is a shape marker, not a byte count.
fn data_len_marker(request: &CommandRequest) -> u64 {
    if request.contains("permanentWatts") || request.contains("cableLength608") {
        DATA_LEN_FLOAT
    } else if request.contains("startVoltage") {
        DATA_LEN_START_VOLTAGE
    } else {
        DATA_LEN_DEFAULT
    }
}

// int32 fields: negative values go on the wire sign-extended to 64 bits.
const INT32_MIN: f64 = i32::MIN as f64;
const INT32_MAX: f64 = i32::MAX as f64;

fn int32_value(name: &'static str, value: CommandValue) -> Result<i64> {
    match value {
        CommandValue::Int(raw) if i32::try_from(raw).is_ok() => Ok(raw),
        CommandValue::Int(raw) => Err(EncodeError::OutOfRange {
            name,
            value: raw as f64,
            min: INT32_MIN,
            max: INT32_MAX,
        }),
        CommandValue::Float(raw) => scaled_int32_value(name, raw, 1.0),
    }
}

/// `value * factor` truncated toward zero.
fn scaled_int32_value(name: &'static str, value: f64, factor: f64) -> Result<i64> {
    let scaled = value * factor;
    if !scaled.is_finite() {
        return Err(EncodeError::NotFinite { name, value });
    }

    let truncated = scaled.trunc();
    if !(INT32_MIN..=INT32_MAX).contains(&truncated) {
        return Err(EncodeError::OutOfRange {
            name,
            value,
            min: INT32_MIN / factor,
            max: INT32_MAX / factor,
        });
    }
    Ok(truncated as i64)
}

fn float_value(name: &'static str, value: CommandValue) -> Result<f32> {
    let raw = value.as_f64();
    if !raw.is_finite() {
        return Err(EncodeError::NotFinite { name, value: raw });
    }
    let max = f64::from(f32::MAX);
    if raw.abs() > max {
        return Err(EncodeError::OutOfRange {
            name,
            value: raw,
            min: -max,
            max,
        });
    }
    Ok(raw as f32)
}

fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
