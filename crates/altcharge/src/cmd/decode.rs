use altcharge_proto::{classify, DecoderConfig, Envelope, FrameClass, HeartbeatDecoder, Telemetry};
use serde::Serialize;

use crate::cmd::{load_frame, DecodeArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct DecodeOutput<'a> {
    sequence: Option<u64>,
    class: Option<FrameClass>,
    frame_size: usize,
    telemetry: &'a Telemetry,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = load_frame(&args.frame)?;
    let decoder = HeartbeatDecoder::with_config(decoder_config(&args));

    let telemetry = decoder.decode_with_hint(&frame, args.seq);
    let sequence = args.seq.or(Envelope::locate(&frame).sequence_number);

    let out = DecodeOutput {
        sequence,
        class: sequence.map(classify),
        frame_size: frame.len(),
        telemetry: &telemetry,
    };
    print_decoded(&out, format);
    Ok(SUCCESS)
}

fn decoder_config(args: &DecodeArgs) -> DecoderConfig {
    DecoderConfig {
        heartbeat_plaintext_fallback: !args.no_plaintext_fallback,
        response_xor_fallback: args.response_xor_fallback,
        max_nesting: args.max_nesting,
    }
}

fn print_decoded(out: &DecodeOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_table(
            &["FIELD", "VALUE"],
            out.telemetry
                .iter()
                .map(|(name, value)| vec![name.to_string(), value.to_string()]),
        ),
        OutputFormat::Pretty => {
            let class = out.class.map(FrameClass::name).unwrap_or("unknown");
            match out.sequence {
                Some(seq) => println!("seq={seq} class={class} size={}", out.frame_size),
                None => println!("seq=none class={class} size={}", out.frame_size),
            }
            for (name, value) in out.telemetry.iter() {
                println!("  {name}={value}");
            }
        }
        OutputFormat::Raw => print_json(out.telemetry),
    }
}
