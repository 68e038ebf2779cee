use crate::error::{Result, WireError};
use crate::types::{WireField, WireType, WireValue};

const FIXED32_SIZE: usize = 4;
const FIXED64_SIZE: usize = 8;

/// Forward-only cursor over a wire-format buffer.
///
/// Every read advances the cursor only when it succeeds, so a caller can stop
/// at the first corrupt field and keep everything decoded before it.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> WireReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::at(buf, 0)
    }

    /// Create a reader positioned at `pos` (clamped to the buffer length).
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self {
            buf,
            pos: pos.min(buf.len()),
            failed: false,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once the cursor has reached the end of the buffer.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a base-128 varint, least-significant group first.
    ///
    /// Any number of continuation bytes is accepted; bits past 64 are dropped.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        let mut cursor = self.pos;

        loop {
            let Some(&byte) = self.buf.get(cursor) else {
                return Err(WireError::Truncated {
                    needed: cursor - self.pos + 1,
                    remaining: self.remaining(),
                });
            };
            cursor += 1;

            if shift < u64::BITS {
                value |= u64::from(byte & 0x7F) << shift;
            }
            if byte & 0x80 == 0 {
                self.pos = cursor;
                return Ok(value);
            }
            shift = shift.saturating_add(7);
        }
    }

    /// Read a tag and split it into field number and wire type.
    pub fn read_tag(&mut self) -> Result<(u32, WireType)> {
        let start = self.pos;
        let raw = self.read_varint()?;

        let wire_type = match WireType::try_from((raw & 0x7) as u8) {
            Ok(wire_type) => wire_type,
            Err(err) => {
                self.pos = start;
                return Err(err);
            }
        };
        let number = match u32::try_from(raw >> 3) {
            Ok(number) => number,
            Err(_) => {
                self.pos = start;
                return Err(WireError::FieldNumberOutOfRange(raw >> 3));
            }
        };

        Ok((number, wire_type))
    }

    /// Read a length varint followed by that many bytes.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let len = self.read_varint()?;
        let available = self.remaining();

        match usize::try_from(len) {
            Ok(len) if len <= available => {
                let bytes = &self.buf[self.pos..self.pos + len];
                self.pos += len;
                Ok(bytes)
            }
            _ => {
                self.pos = start;
                Err(WireError::Truncated {
                    needed: usize::try_from(len).unwrap_or(usize::MAX),
                    remaining: available,
                })
            }
        }
    }

    /// Read four bytes as a little-endian IEEE-754 float.
    pub fn read_fixed32_float(&mut self) -> Result<f32> {
        let bytes = self.take::<FIXED32_SIZE>()?;
        Ok(f32::from_le_bytes(bytes))
    }

    /// Advance past an 8-byte fixed value.
    pub fn skip_fixed64(&mut self) -> Result<()> {
        self.take::<FIXED64_SIZE>().map(|_| ())
    }

    /// Read the next complete field.
    ///
    /// Returns `None` at the end of the buffer. On error the cursor stays at
    /// the start of the offending field.
    pub fn next_field(&mut self) -> Option<Result<WireField<'a>>> {
        if self.is_empty() {
            return None;
        }

        let start = self.pos;
        let field = self.read_field();
        if field.is_err() {
            self.pos = start;
        }
        Some(field)
    }

    fn read_field(&mut self) -> Result<WireField<'a>> {
        let (number, wire_type) = self.read_tag()?;
        let value = match wire_type {
            WireType::Varint => WireValue::Varint(self.read_varint()?),
            WireType::Fixed64 => {
                self.skip_fixed64()?;
                WireValue::Fixed64
            }
            WireType::LengthDelimited => WireValue::LengthDelimited(self.read_length_delimited()?),
            WireType::Fixed32 => WireValue::Fixed32(self.read_fixed32_float()?),
        };
        Ok(WireField::new(number, value))
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let remaining = self.remaining();
        if remaining < N {
            return Err(WireError::Truncated {
                needed: N,
                remaining,
            });
        }

        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}

/// Yields fields until the end of the buffer or the first structural error.
///
/// The error itself is yielded once; iteration stops after it.
impl<'a> Iterator for WireReader<'a> {
    type Item = Result<WireField<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_field()?;
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::writer::{encode_varint, WireWriter};

    #[test]
    fn read_single_byte_varint() {
        let mut reader = WireReader::new(&[0x2A]);
        assert_eq!(reader.read_varint().unwrap(), 42);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_multi_byte_varint() {
        // 300 = 0b1_0010_1100
        let mut reader = WireReader::new(&[0xAC, 0x02]);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn overlong_varint_is_accepted() {
        // Eleven continuation bytes then a terminator; high bits are dropped.
        let mut bytes = vec![0xFF; 11];
        bytes.push(0x00);
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_varint().unwrap(), u64::MAX);
        assert!(reader.is_empty());
    }

    #[test]
    fn truncated_varint_leaves_cursor() {
        let mut reader = WireReader::new(&[0x80]);
        let err = reader.read_varint().unwrap_err();
        assert!(matches!(err, WireError::Truncated { remaining: 1, .. }));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_tag_splits_number_and_type() {
        // field 14, varint
        let mut reader = WireReader::new(&[0x70]);
        assert_eq!(reader.read_tag().unwrap(), (14, WireType::Varint));
    }

    #[test]
    fn read_tag_rejects_group_wire_type() {
        // field 1, wire type 3 (start group)
        let mut reader = WireReader::new(&[0x0B]);
        assert_eq!(
            reader.read_tag(),
            Err(WireError::UnsupportedWireType(3))
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_tag_rejects_oversized_field_number() {
        let mut buf = bytes::BytesMut::new();
        encode_varint((u64::from(u32::MAX) + 1) << 3, &mut buf);
        let mut reader = WireReader::new(&buf);
        assert!(matches!(
            reader.read_tag(),
            Err(WireError::FieldNumberOutOfRange(_))
        ));
    }

    #[test]
    fn length_delimited_past_end_is_truncation() {
        let mut reader = WireReader::new(&[0x05, 0x01, 0x02]);
        let err = reader.read_length_delimited().unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                needed: 5,
                remaining: 2
            }
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn fixed32_needs_four_bytes() {
        let mut reader = WireReader::new(&[0x00, 0x00, 0x80]);
        assert!(reader.read_fixed32_float().is_err());

        let bytes = 76.5f32.to_le_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_fixed32_float().unwrap(), 76.5);
    }

    #[test]
    fn fixed64_is_skipped() {
        let mut writer = WireWriter::new();
        writer.put_tag(3, WireType::Fixed64);
        writer.put_raw(&[0xAA; 8]);
        writer.put_varint_field(4, 7);
        let bytes = writer.freeze();

        let fields: Vec<_> = WireReader::new(&bytes).collect::<Result<_>>().unwrap();
        assert_eq!(
            fields,
            vec![
                WireField::new(3, WireValue::Fixed64),
                WireField::new(4, WireValue::Varint(7)),
            ]
        );
    }

    #[test]
    fn iterator_stops_after_first_error() {
        let mut writer = WireWriter::new();
        writer.put_varint_field(1, 9);
        writer.put_tag(2, WireType::Fixed32);
        writer.put_raw(&[0x01, 0x02]);
        let bytes = writer.freeze();

        let mut reader = WireReader::new(&bytes);
        assert_eq!(
            reader.next().unwrap().unwrap(),
            WireField::new(1, WireValue::Varint(9))
        );
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn reader_at_offset() {
        let bytes = [0xFF, 0x08, 0x01];
        let mut reader = WireReader::at(&bytes, 1);
        assert_eq!(
            reader.next_field().unwrap().unwrap(),
            WireField::new(1, WireValue::Varint(1))
        );
        assert!(reader.next_field().is_none());
    }

    proptest! {
        #[test]
        fn varint_roundtrip(value in any::<u32>()) {
            let mut buf = bytes::BytesMut::new();
            encode_varint(u64::from(value), &mut buf);
            let mut reader = WireReader::new(&buf);
            prop_assert_eq!(reader.read_varint().unwrap(), u64::from(value));
            prop_assert!(reader.is_empty());
        }

        #[test]
        fn fixed32_roundtrip_is_bit_exact(bits in any::<u32>()) {
            let value = f32::from_bits(bits);
            let mut writer = WireWriter::new();
            writer.put_fixed32_float_field(1, value);
            let bytes = writer.freeze();
            let mut reader = WireReader::new(&bytes);
            reader.read_tag().unwrap();
            prop_assert_eq!(reader.read_fixed32_float().unwrap().to_bits(), bits);
        }

        #[test]
        fn tag_roundtrip(
            number in 0u32..=crate::types::MAX_FIELD_NUMBER,
            wire_type in prop_oneof![
                Just(WireType::Varint),
                Just(WireType::Fixed64),
                Just(WireType::LengthDelimited),
                Just(WireType::Fixed32),
            ],
        ) {
            let mut writer = WireWriter::new();
            writer.put_tag(number, wire_type);
            let bytes = writer.freeze();
            let mut reader = WireReader::new(&bytes);
            prop_assert_eq!(reader.read_tag().unwrap(), (number, wire_type));
        }

        #[test]
        fn arbitrary_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut reader = WireReader::new(&bytes);
            for field in reader.by_ref() {
                if field.is_err() {
                    break;
                }
            }
            prop_assert!(reader.position() <= bytes.len());
        }
    }
}
