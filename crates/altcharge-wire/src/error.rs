/// Errors that can occur while walking a wire buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The buffer ended inside a tag, varint, length or fixed-width value.
    #[error("truncated input (needed {needed} bytes, {remaining} remaining)")]
    Truncated { needed: usize, remaining: usize },

    /// The tag carries a wire type this format does not use.
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),

    /// The tag's field number does not fit in 32 bits.
    #[error("field number out of range ({0})")]
    FieldNumberOutOfRange(u64),
}

pub type Result<T> = std::result::Result<T, WireError>;
