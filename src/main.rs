use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::path::PathBuf;
use std::time::Duration;
use thinkgear_lib::config::{DecoderConfig, FallbackPolicy, LengthRule};
use thinkgear_lib::{AsyncThinkGear, DataPoint, DecoderStats, TgError};
use tokio::io::AsyncRead;
use tokio::signal;
use tracing::{error, info, warn};

mod logging;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LengthRuleArg {
    /// Only RAW_WAVE and ASIC_EEG_POWER carry a length byte
    Known,
    /// Every code >= 0x80 except 0xBA/0xBC carries a length byte
    Range,
}

/// Stream decoded data points from a ThinkGear (NeuroSky) EEG headset.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bound device node (/dev/rfcomm0, /dev/ttyUSB0), capture file, or `-` for stdin
    #[arg(default_value = "-")]
    path: PathBuf,

    /// Also print RAW_WAVE points (512 per second)
    #[arg(long)]
    raw: bool,

    /// Stop after this many printed data points
    #[arg(short, long)]
    count: Option<u64>,

    /// Print one JSON object per line
    #[arg(long)]
    json: bool,

    /// Drop frames declaring a longer payload (169 in the reference protocol)
    #[arg(long)]
    max_payload: Option<u8>,

    #[arg(long, value_enum, default_value_t = LengthRuleArg::Known)]
    length_rule: LengthRuleArg,

    /// Use the first data byte as the value of unknown points
    #[arg(long)]
    first_byte_fallback: bool,

    /// Discard every point of a payload that ends inside a record
    #[arg(long)]
    drop_truncated: bool,

    /// Warn when the headset is silent for this long
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

impl Cli {
    fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig::default()
            .with_max_payload_len(self.max_payload)
            .with_length_rule(match self.length_rule {
                LengthRuleArg::Known => LengthRule::KnownMultiByte,
                LengthRuleArg::Range => LengthRule::CodeRange,
            })
            .with_fallback(if self.first_byte_fallback {
                FallbackPolicy::FirstByte
            } else {
                FallbackPolicy::RawInteger
            })
            .with_drop_truncated_payloads(self.drop_truncated)
            .with_read_timeout(Duration::from_millis(self.timeout_ms))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose.tracing_level_filter(), cli.log_file.as_deref())?;

    match run(&cli).await {
        Ok(stats) => {
            info!(
                frames = stats.frames,
                checksum_errors = stats.checksum_errors,
                noise_bytes = stats.noise_bytes,
                data_points = stats.data_points,
                "Decoder statistics"
            );
            Ok(())
        }
        Err(e) => {
            error!("Application failed: {:?}", e);
            std::process::exit(1);
        }
    }
}

async fn open(cli: &Cli) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    if cli.path.as_os_str() == "-" {
        info!("Reading ThinkGear stream from stdin");
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(&cli.path)
        .await
        .with_context(|| format!("Failed to open {}", cli.path.display()))?;
    info!(path = %cli.path.display(), "Opened ThinkGear stream");
    Ok(Box::new(file))
}

async fn run(cli: &Cli) -> Result<DecoderStats> {
    let reader = open(cli).await?;
    let mut device = AsyncThinkGear::with_config(reader, cli.decoder_config());

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed = 0u64;
    loop {
        let point = tokio::select! {
            res = device.read_one() => res,
            _ = &mut ctrl_c => {
                info!("Ctrl+C received, shutting down gracefully.");
                break;
            }
        };
        let point = match point {
            Ok(point) => point,
            Err(TgError::Timeout(_)) => {
                warn!(
                    buffered = device.decoder().buffered(),
                    "No data from headset for {} ms", cli.timeout_ms
                );
                continue;
            }
            Err(TgError::ConnectionClosed) => {
                info!("End of stream");
                break;
            }
            Err(e) => return Err(e).context("Failed to read ThinkGear stream"),
        };

        if point.is_raw_wave() && !cli.raw {
            continue;
        }
        print_point(&point, cli.json)?;
        printed += 1;
        if cli.count.is_some_and(|count| printed >= count) {
            break;
        }
    }
    Ok(device.stats())
}

fn print_point(point: &DataPoint, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(point)?);
    } else if point.extended_code_level > 0 {
        println!("{} (extended code level {})", point, point.extended_code_level);
    } else {
        println!("{}", point);
    }
    Ok(())
}
