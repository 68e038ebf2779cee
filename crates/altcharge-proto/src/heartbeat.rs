use altcharge_wire::{WireReader, WireValue};
use tracing::{debug, warn};

use crate::classify::{classify, FrameClass};
use crate::config::DecoderConfig;
use crate::envelope::{field, Envelope};
use crate::fields::{FieldMap, FieldSpec, ValueKind};
use crate::telemetry::{Telemetry, TelemetryValue};
use crate::xor;

/// Sub-message levels above the payload (outer wrapper and header) that the
/// decoder descends through when a frame carries no sequence number.
const ENVELOPE_DEPTH: usize = 2;

/// Decodes heartbeat and command-response frames into named telemetry.
///
/// Decoding never fails: a frame that cannot be walked at all yields an empty
/// [`Telemetry`], a frame that breaks part-way yields what was read before the
/// break. Both cases are logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartbeatDecoder {
    config: DecoderConfig,
}

impl HeartbeatDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode a raw frame as delivered by the transport.
    pub fn decode(&self, frame: &[u8]) -> Telemetry {
        self.decode_with_hint(frame, None)
    }

    /// Decode a raw frame, using `sequence_hint` in place of the envelope's
    /// sequence number when the transport has already parsed it.
    pub fn decode_with_hint(&self, frame: &[u8], sequence_hint: Option<u64>) -> Telemetry {
        if frame.is_empty() {
            return Telemetry::new();
        }

        let envelope = Envelope::locate(frame);
        if let Some(err) = envelope.error {
            debug!(%err, "envelope walk stopped early");
        }

        let Some(sequence) = sequence_hint.or(envelope.sequence_number) else {
            debug!(len = frame.len(), "no sequence number, decoding frame as plaintext");
            let depth = self.config.max_nesting.saturating_add(ENVELOPE_DEPTH);
            let telemetry = self.decode_plain(frame, depth);
            if telemetry.is_empty() {
                warn!(len = frame.len(), "frame yielded no known fields");
            }
            return telemetry;
        };

        // Without a header of its own the frame is the bare payload the
        // transport already unwrapped; its bytes may still be encrypted.
        let payload = match (envelope.sequence_number, envelope.payload) {
            (Some(_), Some(payload)) => payload,
            _ if sequence_hint.is_some() => frame,
            _ => {
                debug!(sequence, "header carries no payload");
                return Telemetry::new();
            }
        };
        let class = classify(sequence);
        let key = xor::key_for(sequence);
        debug!(sequence, class = class.name(), len = payload.len(), "decoding payload");

        let telemetry = match class {
            FrameClass::Heartbeat => {
                let decrypted = self.decode_decrypted(payload, key);
                if decrypted.is_empty() && self.config.heartbeat_plaintext_fallback {
                    debug!(sequence, "decrypted heartbeat empty, retrying as plaintext");
                    self.decode_plain(payload, self.config.max_nesting)
                } else {
                    decrypted
                }
            }
            FrameClass::CommandResponse => {
                let plain = self.decode_plain(payload, self.config.max_nesting);
                if plain.is_empty() && self.config.response_xor_fallback {
                    debug!(sequence, "plaintext response empty, retrying decrypted");
                    self.decode_decrypted(payload, key)
                } else {
                    plain
                }
            }
        };

        if telemetry.is_empty() {
            warn!(sequence, class = class.name(), "frame yielded no known fields");
        }
        telemetry
    }

    fn decode_decrypted(&self, payload: &[u8], key: u8) -> Telemetry {
        let mut decrypted = payload.to_vec();
        xor::apply_in_place(&mut decrypted, key);
        self.decode_plain(&decrypted, self.config.max_nesting)
    }

    fn decode_plain(&self, payload: &[u8], max_nesting: usize) -> Telemetry {
        let map = FieldMap::global();
        let mut telemetry = walk_payload(map, payload, max_nesting);
        map.adjust(&mut telemetry);
        telemetry
    }
}

/// Map every known field in `payload` to its name; last occurrence wins.
///
/// A length-delimited field 1 is walked as a nested payload and merged in
/// place while `depth` allows it.
fn walk_payload(map: &FieldMap, payload: &[u8], depth: usize) -> Telemetry {
    let mut telemetry = Telemetry::new();

    for item in WireReader::new(payload) {
        let wire = match item {
            Ok(wire) => wire,
            Err(err) => {
                debug!(%err, decoded = telemetry.len(), "payload walk stopped early");
                break;
            }
        };

        match wire.value {
            WireValue::Varint(raw) => {
                if let Some(spec) = map.telemetry_field(wire.number) {
                    note_kind(spec, ValueKind::Int);
                    // int32 negatives arrive sign-extended to 64 bits.
                    telemetry.insert(spec.name, TelemetryValue::Int(raw as i64));
                }
            }
            WireValue::Fixed32(value) => {
                if let Some(spec) = map.telemetry_field(wire.number) {
                    note_kind(spec, ValueKind::Float);
                    telemetry.insert(spec.name, TelemetryValue::Float(value));
                }
            }
            WireValue::LengthDelimited(nested) if wire.number == field::PDATA && depth > 0 => {
                telemetry.merge(walk_payload(map, nested, depth - 1));
            }
            _ => {}
        }
    }

    telemetry
}

/// Log a known field whose wire type differs from its table entry.
fn note_kind(spec: &FieldSpec, received: ValueKind) {
    if spec.kind != received {
        debug!(
            field = spec.number,
            name = spec.name,
            expected = ?spec.kind,
            received = ?received,
            "field arrived with an unexpected wire type"
        );
    }
}

/// Decode `raw` with the default decoder.
pub fn decode_heartbeat(raw: &[u8], sequence_hint: Option<u64>) -> Telemetry {
    HeartbeatDecoder::new().decode_with_hint(raw, sequence_hint)
}
