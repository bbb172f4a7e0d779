//! # WLAN Payload Tool
//!
//! Ground-station companion to the tracker: decodes received uplink payloads
//! into JSON lines, and encodes logged scans into payloads for testing the
//! radio path.
//!
//! ```bash
//! wlan-payload decode 01aadd441166ffe90b
//! wlan-payload encode --max-records 5 < wlan_scans.txt
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use wlan_tracker::ground::{decode_hex_line, encode_json_line};
use wlan_tracker::payload::protocol::DEFAULT_MAX_RECORDS;

#[derive(Debug, Parser)]
#[command(name = "wlan-payload", version, about = "Encode and decode compact WLAN scan payloads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode hex payloads into JSON lines
    Decode {
        /// Hex payloads; read one per stdin line when omitted
        payloads: Vec<String>,
    },
    /// Encode JSON-array scan lines from stdin into hex payloads
    Encode {
        /// Most access points kept per payload
        #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
        max_records: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let failures = match cli.command {
        Command::Decode { payloads } if !payloads.is_empty() => {
            process(payloads.into_iter().map(Ok), |hex| decode_hex_line(hex, Utc::now()))?
        }
        Command::Decode { .. } => process(io::stdin().lock().lines(), |hex| decode_hex_line(hex, Utc::now()))?,
        Command::Encode { max_records } => {
            process(io::stdin().lock().lines(), |line| encode_json_line(line, max_records))?
        }
    };

    if failures > 0 {
        bail!("{} input line(s) failed", failures);
    }
    Ok(())
}

/// Convert each non-blank input line, printing results to stdout and
/// failures to stderr; returns the number of failures
fn process<I, F>(lines: I, convert: F) -> Result<usize>
where
    I: Iterator<Item = io::Result<String>>,
    F: Fn(&str) -> wlan_tracker::error::Result<String>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0;

    for (number, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match convert(&line) {
            Ok(converted) => writeln!(out, "{}", converted)?,
            Err(e) => {
                eprintln!("line {}: {}", number + 1, e);
                failures += 1;
            }
        }
    }

    Ok(failures)
}
