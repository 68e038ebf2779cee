use altcharge_proto::{classify, xor, Envelope, EnvelopeHeader, FieldMap, FrameClass};
use altcharge_wire::{WireReader, WireValue};
use serde::Serialize;

use crate::cmd::{load_frame, InspectArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{hex_string, print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct FieldOutput {
    number: u32,
    wire_type: &'static str,
    value: String,
    name: Option<&'static str>,
}

#[derive(Serialize)]
struct InspectOutput {
    header: EnvelopeHeader,
    class: Option<FrameClass>,
    xor_key: Option<u8>,
    fields: Vec<FieldOutput>,
    error: Option<String>,
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = load_frame(&args.frame)?;
    let out = inspect(&frame, args.seq);

    match format {
        OutputFormat::Json | OutputFormat::Raw => print_json(&out),
        OutputFormat::Table => {
            print_header(&out);
            print_table(
                &["FIELD", "WIRE TYPE", "NAME", "VALUE"],
                out.fields.iter().map(|f| {
                    vec![
                        f.number.to_string(),
                        f.wire_type.to_string(),
                        f.name.unwrap_or("-").to_string(),
                        f.value.clone(),
                    ]
                }),
            );
        }
        OutputFormat::Pretty => {
            print_header(&out);
            for f in &out.fields {
                println!(
                    "  #{} {} {} = {}",
                    f.number,
                    f.wire_type,
                    f.name.unwrap_or("?"),
                    f.value
                );
            }
        }
    }
    Ok(SUCCESS)
}

/// Walk the envelope and the payload (decrypted when the class calls for it)
/// without dropping unknown fields.
fn inspect(frame: &[u8], sequence_hint: Option<u64>) -> InspectOutput {
    let envelope = Envelope::locate(frame);
    let header = EnvelopeHeader::parse(envelope.header);
    let sequence = sequence_hint.or(envelope.sequence_number);
    let class = sequence.map(classify);

    let xor_key = match (sequence, class) {
        (Some(seq), Some(class)) if class.is_encrypted() => Some(xor::key_for(seq)),
        _ => None,
    };
    let payload = envelope.payload.unwrap_or(frame);
    let payload = match xor_key {
        Some(key) => xor::apply(payload, key),
        None => payload.to_vec(),
    };

    let map = FieldMap::global();
    let mut fields = Vec::new();
    let mut error = envelope.error.map(|err| format!("header: {err}"));
    for item in WireReader::new(&payload) {
        match item {
            Ok(wire) => fields.push(FieldOutput {
                number: wire.number,
                wire_type: wire.wire_type().name(),
                value: display_value(wire.value),
                name: match wire.value {
                    WireValue::Varint(_) | WireValue::Fixed32(_) => {
                        map.telemetry_field(wire.number).map(|spec| spec.name)
                    }
                    _ => None,
                },
            }),
            Err(err) => {
                error = Some(format!("payload: {err}"));
                break;
            }
        }
    }

    InspectOutput {
        header,
        class,
        xor_key,
        fields,
        error,
    }
}

fn display_value(value: WireValue<'_>) -> String {
    match value {
        WireValue::Varint(raw) => raw.to_string(),
        WireValue::Fixed64 => "<8 bytes>".to_string(),
        WireValue::LengthDelimited(bytes) => format!("<{} bytes> {}", bytes.len(), hex_string(bytes)),
        WireValue::Fixed32(value) => value.to_string(),
    }
}

fn print_header(out: &InspectOutput) {
    let h = &out.header;
    let show = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    println!("Envelope:");
    println!("  seq:       {}", show(h.seq));
    println!(
        "  class:     {}",
        out.class.map(FrameClass::name).unwrap_or("unknown")
    );
    println!(
        "  xor key:   {}",
        out.xor_key
            .map(|k| format!("0x{k:02x}"))
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  src/dest:  {}/{}", show(h.src), show(h.dest));
    println!("  cmd:       func={} id={}", show(h.cmd_func), show(h.cmd_id));
    println!("  data_len:  {}", show(h.data_len));
    println!("  product:   {}", show(h.product_id));
    println!("  version:   {}", show(h.version));
    if let Some(from) = &h.from {
        println!("  from:      {from}");
    }
    if let Some(err) = &out.error {
        println!("  error:     {err}");
    }
}

#[cfg(test)]
mod tests {
    use altcharge_proto::envelope::field;
    use altcharge_wire::WireWriter;

    use super::*;

    #[test]
    fn inspect_decrypts_heartbeat_and_keeps_unknown_fields() {
        let mut pdata = WireWriter::new();
        pdata.put_varint_field(102, 30);
        pdata.put_varint_field(999, 4);
        let encrypted = xor::apply(pdata.as_bytes(), 50);

        let mut header = WireWriter::new();
        header.put_bytes_field(field::PDATA, &encrypted);
        header.put_varint_field(field::SEQ, 50);
        let frame = header.freeze();

        let out = inspect(&frame, None);
        assert_eq!(out.class, Some(FrameClass::Heartbeat));
        assert_eq!(out.xor_key, Some(50));
        assert_eq!(out.header.seq, Some(50));
        assert_eq!(out.fields.len(), 2);
        assert_eq!(out.fields[0].name, Some("temp"));
        assert_eq!(out.fields[0].value, "30");
        assert_eq!(out.fields[1].name, None);
        assert!(out.error.is_none());
    }

    #[test]
    fn inspect_reports_truncation() {
        let out = inspect(&[0x80], None);
        assert!(out.fields.is_empty());
        assert!(out.error.is_some());
    }
}
