//! Demo of a logging facade built on the caller resolver
//!
//! Every line is tagged with the file and line of the code that asked for
//! the message, not of the helpers in between.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod logger;

use logger::{Format, Log};

#[derive(Parser, Debug)]
#[command(name = "caller-demo")]
#[command(about = "Log messages tagged with their real call site", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of frames fetched per caller walk
    #[arg(short, long, env = "CALLER_FRAMES", default_value_t = caller::DEFAULT_NUMBER_OF_FRAMES_TO_GET)]
    frames: usize,

    /// Emit JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Print absolute file paths
    #[arg(long)]
    absolute: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = caller::Config {
        frame_depth: cli.frames,
    };
    let format = if cli.json { Format::Json } else { Format::Text };
    let mut log = Log::new(&config, format, std::io::stdout().lock())
        .context("Invalid resolver configuration")?;
    if !cli.absolute {
        log = log.with_root(env!("CARGO_MANIFEST_DIR"));
    }
    // Called often, so ignored once up front.
    log.resolver().ignore_function("double_message_info");
    debug!(
        "Ignoring functions {:?}",
        log.resolver().ignored_functions()
    );

    log.info("First info message")?;
    double_message_info(&log, "This message is doubled")?;
    fatal_info(&log, "Last info message")?;
    Ok(())
}

/// Rarely called, so it marks itself as a helper on every call.
#[inline(never)]
fn fatal_info<W: Write>(log: &Log<W>, msg: &str) -> Result<()> {
    log.resolver().helper();
    log.warn(msg)?;
    println!("Would exit here");
    Ok(())
}

#[inline(never)]
fn double_message_info<W: Write>(log: &Log<W>, msg: &str) -> Result<()> {
    log.info(msg)?;
    println!("{}", msg);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
