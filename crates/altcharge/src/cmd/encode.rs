use altcharge_proto::{CommandEncoder, CommandRequest, CommandValue, EnvelopeHeader, FieldMap};
use serde::Serialize;
use tracing::warn;

use crate::cmd::EncodeArgs;
use crate::exit::{encode_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{hex_string, print_json, print_raw, print_table, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput<'a> {
    params: &'a CommandRequest,
    seq: Option<u64>,
    data_len: Option<u64>,
    size: usize,
    hex: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = resolve_request(&args)?;
    let map = FieldMap::global();
    for (name, _) in request.iter() {
        if map.param(name).is_none() {
            warn!(name, "parameter is not writable, ignoring");
        }
    }

    let encoder = CommandEncoder::new();
    let frame = match args.seq {
        Some(seq) => encoder.encode_with_seq(&request, seq),
        None => encoder.encode(&request),
    }
    .map_err(|err| encode_error("encode failed", err))?;

    if let OutputFormat::Raw = format {
        print_raw(&frame);
        return Ok(SUCCESS);
    }

    let header = EnvelopeHeader::parse(altcharge_proto::Envelope::locate(&frame).header);
    let out = EncodeOutput {
        params: &request,
        seq: header.seq,
        data_len: header.data_len,
        size: frame.len(),
        hex: hex_string(&frame),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            &["SEQ", "DATA_LEN", "SIZE", "HEX"],
            [vec![
                display_opt(out.seq),
                display_opt(out.data_len),
                out.size.to_string(),
                out.hex.clone(),
            ]],
        ),
        OutputFormat::Pretty | OutputFormat::Raw => println!("{}", out.hex),
    }
    Ok(SUCCESS)
}

fn resolve_request(args: &EncodeArgs) -> CliResult<CommandRequest> {
    if let Some(json) = &args.json {
        return serde_json::from_str(json).map_err(|err| {
            CliError::new(USAGE, format!("--json is not an object of numbers: {err}"))
        });
    }

    let mut request = CommandRequest::new();
    for param in &args.param {
        let (name, value) = parse_param(param)?;
        request.insert(name, value);
    }
    Ok(request)
}

fn parse_param(input: &str) -> CliResult<(String, CommandValue)> {
    let Some((name, raw)) = input.split_once('=') else {
        return Err(CliError::new(
            USAGE,
            format!("parameter must be NAME=VALUE: {input}"),
        ));
    };
    let name = name.trim();
    let raw = raw.trim();
    if name.is_empty() {
        return Err(CliError::new(USAGE, format!("parameter name is empty: {input}")));
    }

    let value = match raw {
        "true" | "on" => CommandValue::from(true),
        "false" | "off" => CommandValue::from(false),
        _ => match raw.parse::<i64>() {
            Ok(value) => CommandValue::Int(value),
            Err(_) => raw.parse::<f64>().map(CommandValue::Float).map_err(|_| {
                CliError::new(USAGE, format!("invalid value for {name}: {raw}"))
            })?,
        },
    };
    Ok((name.to_string(), value))
}

fn display_opt(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
