//! Heartbeat decoding and command encoding for the alternator charger.
//!
//! The charger publishes two kinds of frames over MQTT, both in the same
//! schema-less wire format:
//! - periodic heartbeats, sequence-numbered with a small counter, whose
//!   payload is XOR-obfuscated with the low byte of that counter
//! - command acknowledgements, sequence-numbered with a millisecond timestamp,
//!   whose payload is plaintext
//!
//! [`HeartbeatDecoder`] turns either into a [`Telemetry`] map of named values.
//! [`CommandEncoder`] builds the outbound frame for a [`CommandRequest`].
//! Neither holds state between calls.

pub mod classify;
pub mod command;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod heartbeat;
pub mod telemetry;
pub mod xor;

pub use classify::{classify, FrameClass, COMMAND_SEQUENCE_THRESHOLD};
pub use command::{encode_command, CommandEncoder, CommandRequest, CommandValue};
pub use config::DecoderConfig;
pub use envelope::{Envelope, EnvelopeHeader};
pub use error::{EncodeError, Result};
pub use fields::{Adjustment, FieldMap, FieldSpec, ParamEncoding, ParamSpec, ValueKind};
pub use heartbeat::{decode_heartbeat, HeartbeatDecoder};
pub use telemetry::{Telemetry, TelemetryValue};
