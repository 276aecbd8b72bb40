//! Configuration loaded once at startup from a TOML file.
//!
//! ```toml
//! up = "ArrowUp"
//! down = "ArrowDown"
//! left = "ArrowLeft"
//! right = "ArrowRight"
//! c = "C"
//! z = "Z"
//! x_dead_zone = 65
//! y_dead_zone = 65
//! debounce_time = 0.016666
//! debug = false
//! output = "uinput"
//!
//! [peripheral]
//! i2c_bus = 1
//! address = 0x52
//! detect_retry_interval = 1.0
//! center = 127
//! ```
//!
//! Omitted options take their defaults; an omitted key leaves that channel
//! unmapped. Malformed values (unknown key names, unknown options, negative
//! intervals) are rejected instead of being treated as absent.

use crate::controller::NUNCHUK_ADDRESS;
use crate::mapping::KeyBindings;
use egui::Key;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_DIR: &str = "nunchuk-keys";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_DEAD_ZONE: u8 = 65;
const DEFAULT_DEBOUNCE_SECS: f64 = 1.0 / 60.0;
const DEFAULT_DETECT_RETRY_SECS: f64 = 1.0;
const DEFAULT_I2C_BUS: u8 = 1;
const DEFAULT_CENTER: u8 = 127;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file does not exist: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Where key actions go
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// Virtual keyboard on the host
    #[default]
    Uinput,
    /// Dry run, actions are only logged
    Log,
}

/// Runtime configuration, immutable after load
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bindings: KeyBindings,
    pub x_dead_zone: u8,
    pub y_dead_zone: u8,
    pub poll_interval: Duration,
    pub debug: bool,
    pub output: Output,
    pub peripheral: PeripheralConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PeripheralConfig {
    pub i2c_bus: u8,
    pub address: u16,
    pub detect_retry_interval: Duration,
    pub center: u8,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            i2c_bus: DEFAULT_I2C_BUS,
            address: NUNCHUK_ADDRESS,
            detect_retry_interval: Duration::from_secs_f64(DEFAULT_DETECT_RETRY_SECS),
            center: DEFAULT_CENTER,
        }
    }
}

/// Built-in configuration used when no config file exists: arrow keys on the
/// stick, `C` and `Z` on the buttons.
impl Default for Config {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::standard(),
            x_dead_zone: DEFAULT_DEAD_ZONE,
            y_dead_zone: DEFAULT_DEAD_ZONE,
            poll_interval: Duration::from_secs_f64(DEFAULT_DEBOUNCE_SECS),
            debug: false,
            output: Output::default(),
            peripheral: PeripheralConfig::default(),
        }
    }
}

// On-disk layout
#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    up: Option<Key>,
    down: Option<Key>,
    left: Option<Key>,
    right: Option<Key>,
    c: Option<Key>,
    z: Option<Key>,
    x_dead_zone: u8,
    y_dead_zone: u8,
    debounce_time: f64,
    debug: bool,
    output: Output,
    peripheral: PeripheralFile,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            up: None,
            down: None,
            left: None,
            right: None,
            c: None,
            z: None,
            x_dead_zone: DEFAULT_DEAD_ZONE,
            y_dead_zone: DEFAULT_DEAD_ZONE,
            debounce_time: DEFAULT_DEBOUNCE_SECS,
            debug: false,
            output: Output::default(),
            peripheral: PeripheralFile::default(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct PeripheralFile {
    i2c_bus: u8,
    address: u16,
    detect_retry_interval: f64,
    center: u8,
}

impl Default for PeripheralFile {
    fn default() -> Self {
        Self {
            i2c_bus: DEFAULT_I2C_BUS,
            address: NUNCHUK_ADDRESS,
            detect_retry_interval: DEFAULT_DETECT_RETRY_SECS,
            center: DEFAULT_CENTER,
        }
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: format!("{} ({})", e, value),
    })
}

impl TryFrom<ConfigFile> for Config {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        if file.peripheral.address > 0x7F {
            return Err(ConfigError::InvalidValue {
                field: "peripheral.address",
                reason: format!("{:#x} is not a 7-bit I2C address", file.peripheral.address),
            });
        }

        Ok(Self {
            bindings: KeyBindings {
                up: file.up,
                down: file.down,
                left: file.left,
                right: file.right,
                c: file.c,
                z: file.z,
            },
            x_dead_zone: file.x_dead_zone,
            y_dead_zone: file.y_dead_zone,
            poll_interval: seconds("debounce_time", file.debounce_time)?,
            debug: file.debug,
            output: file.output,
            peripheral: PeripheralConfig {
                i2c_bus: file.peripheral.i2c_bus,
                address: file.peripheral.address,
                detect_retry_interval: seconds(
                    "peripheral.detect_retry_interval",
                    file.peripheral.detect_retry_interval,
                )?,
                center: file.peripheral.center,
            },
        })
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Config::try_from(file)
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if given (it must exist), otherwise the file at
    /// [`Config::default_path`] if present, otherwise the built-in defaults.
    ///
    /// Runs before logging is set up, since the log level depends on `debug`.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !file_exists(path).await? {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            return Self::load(path).await;
        }

        if let Some(default_path) = Self::default_path() {
            if file_exists(&default_path).await? {
                return Self::load(&default_path).await;
            }
        }

        Ok(Self::default())
    }

    /// `$XDG_CONFIG_HOME/nunchuk-keys/config.toml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}

async fn file_exists(path: &Path) -> Result<bool, ConfigError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}
