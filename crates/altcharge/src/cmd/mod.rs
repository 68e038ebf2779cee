use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::{hex_error, io_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a heartbeat or command-response frame into named telemetry.
    Decode(DecodeArgs),
    /// Encode a write command frame from named parameters.
    Encode(EncodeArgs),
    /// Dump the envelope header and raw payload fields of a frame.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where to read a frame from. With neither argument, hex is read from stdin.
#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Frame bytes as hex (whitespace and a leading 0x are ignored).
    #[arg(value_name = "HEX", conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw frame bytes from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Sequence number already known from the transport.
    #[arg(long)]
    pub seq: Option<u64>,
    /// Retry command-response payloads XOR-decrypted when plaintext yields nothing.
    #[arg(long)]
    pub response_xor_fallback: bool,
    /// Do not retry heartbeat payloads as plaintext.
    #[arg(long)]
    pub no_plaintext_fallback: bool,
    /// Extra levels of nested field-1 sub-messages to merge.
    #[arg(long, default_value_t = altcharge_proto::config::DEFAULT_MAX_NESTING)]
    pub max_nesting: usize,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command parameter (repeatable).
    #[arg(long, value_name = "NAME=VALUE", conflicts_with = "json")]
    pub param: Vec<String>,
    /// Command parameters as a JSON object of numbers.
    #[arg(long, value_name = "OBJECT")]
    pub json: Option<String>,
    /// Sequence number to stamp instead of the current time in milliseconds.
    #[arg(long)]
    pub seq: Option<u64>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Sequence number already known from the transport.
    #[arg(long)]
    pub seq: Option<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn load_frame(args: &FrameArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| io_error("failed reading stdin", err))?;
    parse_hex(&input)
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).map_err(|err| hex_error("invalid hex frame", err))
}
