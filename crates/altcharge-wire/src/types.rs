//! Wire types and decoded field records.

use crate::error::WireError;

/// Largest field number a tag can carry (29 bits).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// How a field's value is framed on the wire (low 3 bits of the tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// The 3-bit tag suffix for this wire type.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns a human-readable name for the wire type.
    pub fn name(self) -> &'static str {
        match self {
            WireType::Varint => "VARINT",
            WireType::Fixed64 => "FIXED64",
            WireType::LengthDelimited => "LENGTH_DELIMITED",
            WireType::Fixed32 => "FIXED32",
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            other => Err(WireError::UnsupportedWireType(other)),
        }
    }
}

/// A decoded field value, borrowed from the buffer being walked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireValue<'a> {
    Varint(u64),
    /// Eight bytes were consumed; the value carries no meaning for this format.
    Fixed64,
    LengthDelimited(&'a [u8]),
    /// FIXED32 is always a little-endian IEEE-754 float here.
    Fixed32(f32),
}

impl WireValue<'_> {
    pub fn wire_type(&self) -> WireType {
        match self {
            WireValue::Varint(_) => WireType::Varint,
            WireValue::Fixed64 => WireType::Fixed64,
            WireValue::LengthDelimited(_) => WireType::LengthDelimited,
            WireValue::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// One field produced by a single decode pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireField<'a> {
    /// The field number from the tag.
    pub number: u32,
    /// The field value.
    pub value: WireValue<'a>,
}

impl<'a> WireField<'a> {
    pub fn new(number: u32, value: WireValue<'a>) -> Self {
        Self { number, value }
    }

    pub fn wire_type(&self) -> WireType {
        self.value.wire_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_type_from_known_values() {
        assert_eq!(WireType::try_from(0).unwrap(), WireType::Varint);
        assert_eq!(WireType::try_from(1).unwrap(), WireType::Fixed64);
        assert_eq!(WireType::try_from(2).unwrap(), WireType::LengthDelimited);
        assert_eq!(WireType::try_from(5).unwrap(), WireType::Fixed32);
    }

    #[test]
    fn group_and_reserved_wire_types_rejected() {
        for raw in [3u8, 4, 6, 7] {
            assert_eq!(
                WireType::try_from(raw),
                Err(WireError::UnsupportedWireType(raw))
            );
        }
    }

    #[test]
    fn field_reports_value_wire_type() {
        let field = WireField::new(14, WireValue::Varint(50));
        assert_eq!(field.wire_type(), WireType::Varint);
        assert_eq!(
            WireField::new(1, WireValue::LengthDelimited(b"")).wire_type(),
            WireType::LengthDelimited
        );
    }
}
