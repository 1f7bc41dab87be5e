//! `config` subcommand — show, and optionally write, the resolved configuration.

use std::path::Path;

use super::{BlinkchainError, Config, ConfigOutput, Result, kv, kv_indent, kv_width};

pub(super) fn cmd_config(
    config: Config,
    json: bool,
    custom_path: Option<&Path>,
    write: bool,
) -> Result<()> {
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let errors: Vec<String> = match config.validate() {
        Ok(()) => Vec::new(),
        Err(errs) => errs.iter().map(|e| e.to_string()).collect(),
    };

    if write {
        if !errors.is_empty() {
            return Err(BlinkchainError::Config(format!(
                "not writing invalid config: {}",
                errors.join("; ")
            )));
        }
        let Some(path) = &config_path else {
            return Err(BlinkchainError::Config("No config directory".into()));
        };
        config.save_to(path).map_err(|e| {
            BlinkchainError::Config(format!("cannot write {}: {e}", path.display()))
        })?;
        log::info!("wrote {}", path.display());
    }
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            valid: errors.is_empty(),
            errors,
            settings: config,
        };
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| BlinkchainError::Config(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    let w = kv_width(
        &["Config file:"],
        &[
            "dma_channel:",
            "max_line_bytes:",
            "max_canvas_cells:",
            "channel 0:",
            "channel 1:",
        ],
    );

    match &config_path {
        Some(p) if write => kv("Config file:", format_args!("{} (written)", p.display()), w),
        Some(p) if config_exists => kv("Config file:", format_args!("{} (loaded)", p.display()), w),
        Some(p) => kv(
            "Config file:",
            format_args!("{} (not found, using defaults)", p.display()),
            w,
        ),
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("dma_channel:", config.dma_channel, w);
    kv_indent("max_line_bytes:", config.max_line_bytes, w);
    kv_indent("max_canvas_cells:", config.max_canvas_cells, w);
    if config.channels.is_empty() {
        kv_indent("channel 0:", "(none)", w);
    }
    for (i, ch) in config.channels.iter().enumerate() {
        kv_indent(&format!("channel {i}:"), ch, w);
    }

    if !errors.is_empty() {
        println!();
        println!("Problems:");
        for e in &errors {
            println!("  {e}");
        }
    }
    Ok(())
}
