//! Blinkchain CLI — drive a WS281x LED canvas over a line-oriented protocol.
//!
//! `serve` speaks the command protocol on stdin/stdout. Logging goes to
//! stderr so it never interleaves with replies.

use std::path::PathBuf;

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "blinkchain",
    version,
    about = "Line-oriented command server for WS281x LED canvases"
)]
struct Args {
    /// Output as JSON (for config)
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (per-command trace on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = cli::run(args.command, args.json, args.config.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
