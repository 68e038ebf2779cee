/// Errors that can occur while encoding a command.
///
/// Decoding never fails from the caller's point of view; see
/// [`crate::HeartbeatDecoder`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// The parameter value is NaN or infinite.
    #[error("parameter {name} is not a finite number ({value})")]
    NotFinite { name: &'static str, value: f64 },

    /// The parameter value does not fit the field's wire representation.
    #[error("parameter {name} out of range ({value}, allowed {min}..={max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub type Result<T> = std::result::Result<T, EncodeError>;
