//! Command-line interface for entigen.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use entigen_core::config::{self, DocumentFormat};
use entigen_opentherm::protocol::{self, OtCommandRequest};
use entigen_opentherm::{Event, Frame, MessageDataType, Packet, PacketDecoder, SENSORS};
use serde_json::Value;

/// entigen - Validate device configurations and generate firmware code.
#[derive(Parser, Debug)]
#[command(name = "entigen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a configuration file (TOML or JSON).
    Validate {
        /// Path to the configuration file.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Validate a configuration file and generate code.
    Compile {
        /// Path to the configuration file.
        #[arg(required = true)]
        path: PathBuf,
        /// Write the generated code here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the sensors the OpenTherm hub can publish.
    Sensors {
        /// Print the table as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Decode a raw 32-bit OpenTherm frame.
    Decode {
        /// Frame as hex (0x...) or decimal.
        #[arg(required = true)]
        word: String,
        /// Decode the payload with this data type.
        #[arg(short, long)]
        data_type: Option<String>,
    },
    /// Decode bytes captured from the adapter serial link.
    Packet {
        /// Link bytes as hex.
        #[arg(required = true)]
        bytes: String,
    },
    /// Encode a frame as an adapter command packet.
    Request {
        /// Frame as hex (0x...) or decimal.
        #[arg(required = true)]
        word: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    match args.command {
        Command::Validate { path } => run_validate(&path),
        Command::Compile { path, output } => run_compile(&path, output.as_deref()),
        Command::Sensors { json } => list_sensors(json),
        Command::Decode { word, data_type } => run_decode(&word, data_type.as_deref()),
        Command::Packet { bytes } => run_packet(&bytes),
        Command::Request { word } => run_request(&word),
    }
}

fn init_logging(verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(config::default_log_filter(verbose))
    });

    if config::log_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Read a configuration document, picking the parser from the file extension.
fn load_document(path: &Path) -> Result<Value> {
    let format = DocumentFormat::from_path(path).with_context(|| {
        format!(
            "Unsupported file type for {}, expected .toml or .json",
            path.display()
        )
    })?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let document = match format {
        DocumentFormat::Toml => toml::from_str::<Value>(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        DocumentFormat::Json => serde_json::from_str::<Value>(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
    };
    tracing::debug!(path = %path.display(), ?format, "Loaded document");
    Ok(document)
}

fn run_validate(path: &Path) -> Result<()> {
    let document = load_document(path)?;

    match entigen_opentherm::validate_document(&document) {
        Ok(validated) => {
            println!("Configuration: VALID");
            println!();
            let hub_id = validated.hub.get("id").and_then(Value::as_str).unwrap_or("?");
            println!("Hub:       {}", hub_id);
            let sensors = validated.sensor_names();
            println!("Sensors:   {}", sensors.len());
            for name in sensors {
                println!("  - {}", name);
            }
            Ok(())
        }
        Err(e) => {
            let Some(errors) = e.validation_errors() else {
                return Err(e.into());
            };
            tracing::warn!(path = %path.display(), issues = errors.len(), "Validation failed");
            println!("Configuration: INVALID");
            println!();
            for error in errors.iter() {
                println!("{:<18} {}", error.code(), error);
            }
            std::process::exit(1);
        }
    }
}

fn run_compile(path: &Path, output: Option<&Path>) -> Result<()> {
    let document = load_document(path)?;
    let code = entigen_opentherm::compile(&document)?;

    match output {
        Some(out) => {
            std::fs::write(out, &code)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!(output = %out.display(), bytes = code.len(), "Wrote generated code");
        }
        None => print!("{}", code),
    }
    Ok(())
}

fn list_sensors(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&*SENSORS)?);
        return Ok(());
    }

    println!(
        "{:<32} {:<22} {:<10} {:<8} {}",
        "NAME", "MESSAGE", "DATA TYPE", "UNIT", "DESCRIPTION"
    );
    for (name, sensor) in SENSORS.iter() {
        println!(
            "{:<32} {:<22} {:<10} {:<8} {}",
            name,
            sensor.message.name(),
            sensor.message_data.as_str(),
            sensor.unit_of_measurement.unwrap_or("-"),
            sensor.description
        );
    }
    Ok(())
}

/// Parse `0x`-prefixed hex or decimal.
fn parse_word(word: &str) -> Result<u32> {
    let word = word.trim();
    let parsed = match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => word.replace('_', "").parse::<u32>(),
    };
    parsed.with_context(|| format!("Invalid frame '{}', expected hex (0x...) or decimal", word))
}

fn run_decode(word: &str, data_type: Option<&str>) -> Result<()> {
    let frame = Frame::from_word(parse_word(word)?)?;
    println!("{}", frame.bits());
    println!("{}", frame);

    if let Some(tag) = data_type {
        let data_type: MessageDataType = tag.parse()?;
        println!("{}: {}", data_type, data_type.decode(&frame));
        return Ok(());
    }

    let readers: Vec<_> = SENSORS
        .iter()
        .filter(|(_, s)| Some(s.message) == frame.message_id())
        .collect();
    if readers.is_empty() {
        bail!("No sensor reads message {}, pass --data-type to decode it", frame.id);
    }
    for (name, sensor) in readers {
        println!(
            "{} ({}): {}",
            name,
            sensor.message_data,
            sensor.message_data.decode(&frame)
        );
    }
    Ok(())
}

fn run_packet(bytes: &str) -> Result<()> {
    let cleaned: String = bytes
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let raw = hex::decode(&cleaned).with_context(|| format!("Invalid hex bytes '{}'", bytes))?;

    let events = PacketDecoder::new().push_all(&raw);
    if events.is_empty() {
        bail!("No complete packet in {} bytes", raw.len());
    }
    for event in events {
        match event {
            Event::Packet(Packet::OtCommandResponse(response)) => match response.frame() {
                Ok(frame) => println!(
                    "OT_COMMAND_RESPONSE (status {}): {}",
                    response.response_status, frame
                ),
                Err(e) => println!(
                    "OT_COMMAND_RESPONSE (status {}): {}",
                    response.response_status, e
                ),
            },
            Event::Packet(Packet::LogRequest(log)) => println!("LOG: {}", log.text()),
            Event::Packet(packet) => println!("{:?}", packet),
            Event::Stream(byte) => println!("STREAM: {:#04x}", byte),
            Event::StreamEnd => println!("STREAM END"),
            Event::Dropped(e) => {
                tracing::warn!(error = %e, "Dropped packet");
                println!("DROPPED: {}", e);
            }
        }
    }
    Ok(())
}

fn run_request(word: &str) -> Result<()> {
    let frame = Frame::from_word(parse_word(word)?)?;
    tracing::debug!(%frame, "Encoding command request");
    let packet = protocol::encode(&OtCommandRequest::from(frame));
    println!("{}", hex::encode(packet));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word() {
        assert_eq!(parse_word("0xC0193C80").unwrap(), 0xC019_3C80);
        assert_eq!(parse_word("0xc019_3c80").unwrap(), 0xC019_3C80);
        assert_eq!(parse_word("768").unwrap(), 768);
        assert!(parse_word("0xZZ").is_err());
        assert!(parse_word("-1").is_err());
    }
}
