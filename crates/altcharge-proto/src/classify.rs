//! Heartbeat vs command-response classification.
//!
//! The charger uses a millisecond Unix timestamp as the sequence number of
//! commands and their acknowledgements, and a small counter for heartbeats.
//! The magnitude of the sequence number is the only discriminator available.
//! A firmware that lets the two ranges overlap would break this.

use serde::Serialize;

/// Sequence numbers at or above this value mark a command-response frame.
pub const COMMAND_SEQUENCE_THRESHOLD: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameClass {
    /// Periodic telemetry; payload is XOR-obfuscated.
    Heartbeat,
    /// Acknowledgement of a command; payload is plaintext.
    CommandResponse,
}

impl FrameClass {
    /// Whether the payload of this class is XOR-obfuscated.
    pub fn is_encrypted(self) -> bool {
        matches!(self, FrameClass::Heartbeat)
    }

    pub fn name(self) -> &'static str {
        match self {
            FrameClass::Heartbeat => "heartbeat",
            FrameClass::CommandResponse => "command_response",
        }
    }
}

pub fn classify(sequence_number: u64) -> FrameClass {
    if sequence_number >= COMMAND_SEQUENCE_THRESHOLD {
        FrameClass::CommandResponse
    } else {
        FrameClass::Heartbeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary() {
        assert_eq!(classify(100_000_000), FrameClass::CommandResponse);
        assert_eq!(classify(100_000_001), FrameClass::CommandResponse);
        assert_eq!(classify(99_999_999), FrameClass::Heartbeat);
        assert_eq!(classify(0), FrameClass::Heartbeat);
    }

    #[test]
    fn millisecond_timestamps_are_responses() {
        assert_eq!(classify(1_735_689_600_000), FrameClass::CommandResponse);
    }

    #[test]
    fn only_heartbeats_are_encrypted() {
        assert!(FrameClass::Heartbeat.is_encrypted());
        assert!(!FrameClass::CommandResponse.is_encrypted());
    }
}
