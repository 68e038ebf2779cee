//! Wire codec for the alternator charger's MQTT telemetry and command frames.
//!
//! # Crate Structure
//!
//! - [`wire`]: Schema-less tag/varint wire grammar (reader and writer)
//! - [`proto`]: Heartbeat decoding, frame classification, XOR de-obfuscation
//!   and command encoding
//!
//! The most common entry points are re-exported at the crate root.

/// Re-export wire grammar types.
pub mod wire {
    pub use altcharge_wire::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use altcharge_proto::*;
}

pub use altcharge_proto::{
    decode_heartbeat, encode_command, CommandRequest, CommandValue, DecoderConfig, EncodeError,
    HeartbeatDecoder, Telemetry, TelemetryValue,
};
