//! Server configuration — channel wiring from a TOML file or the command line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dispatch::{DEFAULT_MAX_LINE_BYTES, ServeOptions};
use crate::driver::{CHANNEL_COUNT, ChannelWiring, DriverWiring};
use crate::error::{BlinkchainError, Result};
use crate::led::StripType;
use crate::topology::MAX_CANVAS_CELLS;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# Blinkchain configuration — channel wiring for the LED command server.\n\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// DMA channel used to clock out the LED signal. Default: 5.
    #[serde(default = "default_dma_channel")]
    pub dma_channel: u8,

    /// Longest accepted command line in bytes, payload included.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,

    /// Largest canvas `init_canvas` may allocate, in cells.
    #[serde(default = "default_max_canvas_cells")]
    pub max_canvas_cells: usize,

    /// One or two strip outputs, in channel order.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

/// Wiring of a single strip output.
///
/// Also parses from the command-line form `PIN:COUNT:TYPE`, e.g. `18:144:grb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub gpio_pin: u8,
    pub count: usize,
    /// Color ordering, case-insensitive (`rgb`, `grb`, `grbw`, ...).
    #[serde(default = "default_strip_type")]
    pub strip_type: String,
}

fn default_dma_channel() -> u8 {
    5
}
fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}
fn default_max_canvas_cells() -> usize {
    MAX_CANVAS_CELLS
}
fn default_strip_type() -> String {
    "grb".into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dma_channel: default_dma_channel(),
            max_line_bytes: default_max_line_bytes(),
            max_canvas_cells: default_max_canvas_cells(),
            channels: Vec::new(),
        }
    }
}

impl FromStr for ChannelConfig {
    type Err = BlinkchainError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || BlinkchainError::Config(format!("Invalid channel '{s}' (use PIN:COUNT:TYPE)"));
        let mut parts = s.trim().split(':');
        let (Some(pin), Some(count), Some(strip_type), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        Ok(ChannelConfig {
            gpio_pin: pin.trim().parse().map_err(|_| bad())?,
            count: count.trim().parse().map_err(|_| bad())?,
            strip_type: strip_type.trim().to_string(),
        })
    }
}

impl fmt::Display for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.gpio_pin, self.count, self.strip_type)
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No channel configured.
    NoChannels,
    /// More channels than the hardware has.
    TooManyChannels(usize),
    /// A channel's `strip_type` is not a known ordering.
    InvalidStripType { channel: usize, value: String },
    /// `max_line_bytes` is zero.
    ZeroLineLimit,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoChannels => write!(f, "At least one channel must be configured"),
            ValidationError::TooManyChannels(n) => {
                write!(f, "At most {CHANNEL_COUNT} channels are supported, got {n}")
            }
            ValidationError::InvalidStripType { channel, value } => {
                write!(f, "Invalid strip type {value} for channel {channel}")
            }
            ValidationError::ZeroLineLimit => write!(f, "max_line_bytes must be greater than 0"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("blinkchain"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.channels.is_empty() {
            errors.push(ValidationError::NoChannels);
        }
        if self.channels.len() > CHANNEL_COUNT {
            errors.push(ValidationError::TooManyChannels(self.channels.len()));
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if ch.strip_type.parse::<StripType>().is_err() {
                errors.push(ValidationError::InvalidStripType {
                    channel: i,
                    value: ch.strip_type.clone(),
                });
            }
        }
        if self.max_line_bytes == 0 {
            errors.push(ValidationError::ZeroLineLimit);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Resolve the driver wiring. A missing second channel is disabled.
    pub fn wiring(&self) -> Result<DriverWiring> {
        if let Err(errors) = self.validate() {
            let msg: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(BlinkchainError::Config(msg.join("; ")));
        }
        let channel = |i: usize| -> Result<ChannelWiring> {
            match self.channels.get(i) {
                Some(ch) => Ok(ChannelWiring {
                    gpio_pin: ch.gpio_pin,
                    count: ch.count,
                    strip_type: ch.strip_type.parse()?,
                }),
                None => Ok(ChannelWiring::disabled()),
            }
        };
        Ok(DriverWiring {
            dma_channel: self.dma_channel,
            channels: [channel(0)?, channel(1)?],
        })
    }

    pub fn serve_options(&self) -> ServeOptions {
        ServeOptions {
            max_line_bytes: self.max_line_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(pin: u8, count: usize, strip_type: &str) -> ChannelConfig {
        ChannelConfig {
            gpio_pin: pin,
            count,
            strip_type: strip_type.into(),
        }
    }

    // ── Config defaults ──

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.dma_channel, 5);
        assert!(c.channels.is_empty());
        assert_eq!(c.max_line_bytes, DEFAULT_MAX_LINE_BYTES);
        assert_eq!(c.max_canvas_cells, MAX_CANVAS_CELLS);
    }

    #[test]
    fn serialize_roundtrip() {
        let c = Config {
            dma_channel: 10,
            channels: vec![channel(18, 144, "grbw"), channel(13, 30, "rgb")],
            ..Config::default()
        };
        let toml_str = toml::to_string_pretty(&c).unwrap();
        let c2: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(c2, c);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = "[[channels]]\ngpio_pin = 18\ncount = 64\n";
        let c: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(c.dma_channel, 5);
        assert_eq!(c.channels, vec![channel(18, 64, "grb")]);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let c: Config = toml::from_str("").unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn wrong_type_toml_is_error() {
        let result: std::result::Result<Config, _> = toml::from_str("dma_channel = \"five\"");
        assert!(result.is_err());
    }

    #[test]
    fn config_path_ends_with_toml() {
        if let Some(p) = Config::path() {
            assert!(p.ends_with("blinkchain/config.toml"));
        }
    }

    // ── load_from / save_to ──

    #[test]
    fn load_missing_file_gives_defaults_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (c, warnings) = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(c, Config::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn load_malformed_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is { not valid toml").unwrap();
        let (c, warnings) = Config::load_from(&path);
        assert_eq!(c, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("config parse error"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let c = Config {
            channels: vec![channel(12, 8, "BGR")],
            ..Config::default()
        };
        c.save_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Blinkchain configuration"));
        assert!(!path.with_extension("toml.tmp").exists());
        let (loaded, warnings) = Config::load_from(&path);
        assert!(warnings.is_empty());
        assert_eq!(loaded, c);
    }

    // ── ChannelConfig parsing ──

    #[test]
    fn parse_channel_pin_count_type() {
        let ch: ChannelConfig = "18:144:GRBW".parse().unwrap();
        assert_eq!(ch, channel(18, 144, "GRBW"));
        assert_eq!(ch.to_string(), "18:144:GRBW");
    }

    #[test]
    fn parse_channel_rejects_bad_forms() {
        for s in ["18:144", "18:144:grb:x", "pin:1:rgb", "18:-1:rgb", "256:1:rgb", ""] {
            assert!(s.parse::<ChannelConfig>().is_err(), "{s:?} should fail");
        }
    }

    // ── validate ──

    #[test]
    fn validate_ok() {
        let c = Config {
            channels: vec![channel(18, 10, "rgb"), channel(13, 10, "Gbrw")],
            ..Config::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_collects_all_errors() {
        let c = Config {
            channels: vec![
                channel(18, 10, "rgb"),
                channel(13, 10, "xyz"),
                channel(12, 10, "grb"),
            ],
            max_line_bytes: 0,
            ..Config::default()
        };
        let errors = c.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::TooManyChannels(3),
                ValidationError::InvalidStripType {
                    channel: 1,
                    value: "xyz".into()
                },
                ValidationError::ZeroLineLimit,
            ]
        );
    }

    #[test]
    fn validate_requires_a_channel() {
        let errors = Config::default().validate().unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoChannels]);
    }

    // ── wiring ──

    #[test]
    fn wiring_single_channel_disables_second() {
        let c = Config {
            channels: vec![channel(18, 64, "grb")],
            ..Config::default()
        };
        let w = c.wiring().unwrap();
        assert_eq!(w.dma_channel, 5);
        assert_eq!(w.channels[0].strip_type, StripType::Grb);
        assert_eq!(w.channels[0].count, 64);
        assert_eq!(w.channels[1], ChannelWiring::disabled());
    }

    #[test]
    fn wiring_invalid_strip_type_is_config_error() {
        let c = Config {
            channels: vec![channel(18, 64, "purple")],
            ..Config::default()
        };
        let err = c.wiring().unwrap_err();
        assert!(matches!(err, BlinkchainError::Config(_)));
        assert!(err.to_string().contains("Invalid strip type purple"));
    }
}
