//! `tia-reader.toml` loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;
use tia_watchdog::duration_from_secs;
use tracing_subscriber::EnvFilter;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "tia-reader.toml";

const DEFAULT_BLOCK_LIMIT: usize = 50;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}", path = .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}", path = .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    pub config_path: Option<PathBuf>,
    pub timeouts: Timeouts,
    pub structure: StructureConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

/// Deadline of every guarded engineering call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub config_load: Duration,
    pub connect: Duration,
    pub open_project: Duration,
    pub find_plc: Duration,
    pub list_devices: Duration,
    pub list_blocks: Duration,
    pub find_block: Duration,
    pub read_code: Duration,
    pub dispose: Duration,
    pub structure: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            config_load: Duration::from_secs(10),
            connect: Duration::from_secs(15),
            open_project: Duration::from_secs(60),
            find_plc: Duration::from_secs(15),
            list_devices: Duration::from_secs(20),
            list_blocks: Duration::from_secs(20),
            find_block: Duration::from_secs(20),
            read_code: Duration::from_secs(30),
            dispose: Duration::from_secs(15),
            structure: Duration::from_secs(25),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureConfig {
    /// Blocks listed per folder before the remainder is summarised.
    pub block_limit: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            block_limit: DEFAULT_BLOCK_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Export,
}

impl BackendKind {
    fn parse(text: &str) -> Result<Self, ConfigError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "export" => Ok(Self::Export),
            _ => Err(ConfigError::Invalid(format!(
                "unknown backend.kind '{text}' (expected 'export')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub latency: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: SmolStr,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: SmolStr::new_inline(DEFAULT_LOG_LEVEL),
            file: None,
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            timeouts: Timeouts::default(),
            structure: StructureConfig::default(),
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ReaderConfig {
    /// Load `explicit`, or `tia-reader.toml` in `root` when it exists.
    ///
    /// A missing default file yields the defaults. An explicit path that
    /// cannot be read is an error.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_contents(Some(path), &contents)
    }

    pub fn from_contents(config_path: Option<PathBuf>, contents: &str) -> Result<Self, ConfigError> {
        let parsed: ConfigFile = toml::from_str(contents).map_err(|err| ConfigError::Parse {
            path: config_path.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
            message: err.to_string(),
        })?;
        let base = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            timeouts: parsed.timeouts.into_timeouts(),
            structure: StructureConfig {
                block_limit: parsed.structure.block_limit.unwrap_or(DEFAULT_BLOCK_LIMIT),
            },
            backend: BackendConfig {
                kind: parsed
                    .backend
                    .kind
                    .as_deref()
                    .map(BackendKind::parse)
                    .transpose()?
                    .unwrap_or_default(),
                latency: Duration::from_millis(parsed.backend.latency_ms.unwrap_or(0)),
            },
            logging: LoggingConfig {
                level: parsed
                    .logging
                    .level
                    .as_deref()
                    .map(parse_log_filter)
                    .transpose()?
                    .unwrap_or_else(|| SmolStr::new_inline(DEFAULT_LOG_LEVEL)),
                file: parsed.logging.file.map(|file| resolve_path(&base, &file)),
            },
            config_path,
        })
    }
}

/// Accepts anything `RUST_LOG` accepts, e.g. `warn,tia_reader=debug`.
fn parse_log_filter(directives: &str) -> Result<SmolStr, ConfigError> {
    EnvFilter::try_new(directives).map_err(|err| {
        ConfigError::Invalid(format!("logging.level '{directives}': {err}"))
    })?;
    Ok(SmolStr::new(directives))
}

fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    timeouts: TimeoutsSection,
    #[serde(default)]
    structure: StructureSection,
    #[serde(default)]
    backend: BackendSection,
    #[serde(default)]
    logging: LoggingSection,
}

/// Seconds, fractional allowed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeoutsSection {
    config_load: Option<f64>,
    connect: Option<f64>,
    open_project: Option<f64>,
    find_plc: Option<f64>,
    list_devices: Option<f64>,
    list_blocks: Option<f64>,
    find_block: Option<f64>,
    read_code: Option<f64>,
    dispose: Option<f64>,
    structure: Option<f64>,
}

impl TimeoutsSection {
    fn into_timeouts(self) -> Timeouts {
        let defaults = Timeouts::default();
        let pick = |value: Option<f64>, default: Duration| value.map_or(default, duration_from_secs);
        Timeouts {
            config_load: pick(self.config_load, defaults.config_load),
            connect: pick(self.connect, defaults.connect),
            open_project: pick(self.open_project, defaults.open_project),
            find_plc: pick(self.find_plc, defaults.find_plc),
            list_devices: pick(self.list_devices, defaults.list_devices),
            list_blocks: pick(self.list_blocks, defaults.list_blocks),
            find_block: pick(self.find_block, defaults.find_block),
            read_code: pick(self.read_code, defaults.read_code),
            dispose: pick(self.dispose, defaults.dispose),
            structure: pick(self.structure, defaults.structure),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StructureSection {
    block_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BackendSection {
    kind: Option<String>,
    latency_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    level: Option<String>,
    file: Option<String>,
}
