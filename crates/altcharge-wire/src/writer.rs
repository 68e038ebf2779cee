use bytes::{BufMut, Bytes, BytesMut};

use crate::types::WireType;

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Append `value` as a base-128 varint, least-significant group first.
pub fn encode_varint(mut value: u64, dst: &mut BytesMut) {
    dst.reserve(varint_len(value));
    while value >= 0x80 {
        dst.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    dst.put_u8(value as u8);
}

/// Number of bytes `value` occupies as a varint.
pub fn varint_len(value: u64) -> usize {
    let bits = u64::BITS - (value | 1).leading_zeros();
    bits.div_ceil(7) as usize
}

/// Builds a wire-format buffer field by field.
///
/// Nested messages are built with a separate writer and attached with
/// [`WireWriter::put_message_field`].
#[derive(Debug, Clone, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Append a bare varint.
    pub fn put_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buf);
    }

    /// Append a tag: `(number << 3) | wire_type`.
    pub fn put_tag(&mut self, number: u32, wire_type: WireType) {
        self.put_varint((u64::from(number) << 3) | u64::from(wire_type.as_u8()));
    }

    /// Append bytes verbatim, without a tag or length.
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn put_varint_field(&mut self, number: u32, value: u64) {
        self.put_tag(number, WireType::Varint);
        self.put_varint(value);
    }

    /// Append a FIXED32 field holding a little-endian IEEE-754 float.
    pub fn put_fixed32_float_field(&mut self, number: u32, value: f32) {
        self.put_tag(number, WireType::Fixed32);
        self.buf.put_f32_le(value);
    }

    pub fn put_bytes_field(&mut self, number: u32, bytes: &[u8]) {
        self.put_tag(number, WireType::LengthDelimited);
        self.put_varint(bytes.len() as u64);
        self.buf.put_slice(bytes);
    }

    pub fn put_str_field(&mut self, number: u32, value: &str) {
        self.put_bytes_field(number, value.as_bytes());
    }

    /// Append `message` as a length-delimited sub-message.
    pub fn put_message_field(&mut self, number: u32, message: &WireWriter) {
        self.put_bytes_field(number, message.as_bytes());
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the finished buffer.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
