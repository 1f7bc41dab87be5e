//! CLI subcommands — command server and configuration display.

mod config_cmd;
mod serve;

use std::path::Path;

use clap::{Args, Subcommand};
use serde::Serialize;

pub(super) use blinkchain_lib::config::{ChannelConfig, Config};
pub(super) use blinkchain_lib::error::{BlinkchainError, Result};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Top-level and indented values line up on the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {}", format_kv(key, value, w - 2));
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Command-line overrides for the config file.
#[derive(Args)]
pub struct WiringArgs {
    /// DMA channel (overrides the config file)
    #[arg(long)]
    dma: Option<u8>,
    /// Strip output as PIN:COUNT:TYPE, e.g. 18:144:grb (repeat for channel 1)
    #[arg(long = "channel", value_name = "PIN:COUNT:TYPE")]
    channels: Vec<String>,
    /// Longest accepted command line in bytes
    #[arg(long)]
    max_line_bytes: Option<usize>,
}

impl WiringArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(dma) = self.dma {
            config.dma_channel = dma;
        }
        if !self.channels.is_empty() {
            config.channels = self
                .channels
                .iter()
                .map(|s| s.parse::<ChannelConfig>())
                .collect::<Result<_>>()?;
        }
        if let Some(max) = self.max_line_bytes {
            config.max_line_bytes = max;
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve LED commands on stdin, one reply per command on stdout
    Serve {
        #[command(flatten)]
        wiring: WiringArgs,
    },

    /// Show current configuration and file path
    Config {
        #[command(flatten)]
        wiring: WiringArgs,
        /// Write the resolved configuration to the config file
        #[arg(long)]
        write: bool,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

/// Load config from `custom_path`, or the platform default, logging parse warnings.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    let (config, warnings) = match custom_path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("{w}");
    }
    config
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Serve { wiring } => {
            if json {
                warn_json_unsupported("serve");
            }
            let mut config = load_config(config_path);
            wiring.apply(&mut config)?;
            serve::cmd_serve(&config)
        }
        Command::Config { wiring, write } => {
            let mut config = load_config(config_path);
            wiring.apply(&mut config)?;
            config_cmd::cmd_config(config, json, config_path, write)
        }
    }
}
