use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io::BufRead;
use thinkgear_lib::{SliceSource, TgError, ThinkGear};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Decode hex-encoded ThinkGear byte streams, e.g. captures or datasheet examples.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Hex streams to decode; whitespace is ignored. Reads stdin lines when empty.
    hex: Vec<String>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.hex.is_empty() {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            if !line.trim().is_empty() {
                decode(&line)?;
            }
        }
    } else {
        for input in &cli.hex {
            decode(input)?;
        }
    }
    Ok(())
}

fn decode(input: &str) -> Result<()> {
    let source = SliceSource::from_hex(input)
        .with_context(|| format!("Invalid hex stream: {input}"))?
        .close_at_end();
    let mut device = ThinkGear::new(source);

    loop {
        match device.read_all() {
            Ok(points) => {
                for point in points {
                    println!("{:#04x} {}", point.opcode, point);
                }
            }
            Err(TgError::ConnectionClosed) => break,
            Err(e) => return Err(e.into()),
        }
    }

    let stats = device.stats();
    info!(
        frames = stats.frames,
        checksum_errors = stats.checksum_errors,
        noise_bytes = stats.noise_bytes,
        leftover = device.decoder().buffered(),
        "Stream decoded"
    );
    Ok(())
}
