//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `JCR_ROOT`
//! 3. `root_folder` in the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! The TOML file also carries the `[server]` and `[sync]` sections; every
//! key has a built-in default so an absent or partial file is fine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "JCR_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "jcr.db";

pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/hitfyd/ShowJCR/master/";
pub const DEFAULT_DATA_FOLDER: &str = "中科院分区表及JCR原始数据文件";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Query service listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream source files and fetch behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_data_folder")]
    pub data_folder: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fetches in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSpec>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_folder: default_data_folder(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            sources: default_sources(),
        }
    }
}

impl SyncConfig {
    /// Download URL of one source file
    pub fn source_url(&self, source: &SourceSpec) -> String {
        let base = self.base_url.trim_end_matches('/');
        let folder = self.data_folder.trim_matches('/');
        if folder.is_empty() {
            format!("{}/{}", base, source.file)
        } else {
            format!("{}/{}/{}", base, folder, source.file)
        }
    }
}

/// One upstream file and the table it is loaded into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub table: String,
    pub file: String,
}

impl SourceSpec {
    pub fn new(table: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            file: file.into(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_data_folder() -> String {
    DEFAULT_DATA_FOLDER.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    4
}

/// Published ShowJCR tables
pub fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new("JCR2024", "JCR2024.csv"),
        SourceSpec::new("JCR2023", "JCR2023.csv"),
        SourceSpec::new("JCR2022", "JCR2022.csv"),
        SourceSpec::new("FQBJCR2025", "2025年中科院升级版.csv"),
        SourceSpec::new("FQBJCR2023", "2023年中科院升级版.csv"),
        SourceSpec::new("FQBJCR2022", "2022年中科院升级版.csv"),
        SourceSpec::new("GJQKYJMD2025", "国际期刊预警名单2025.csv"),
        SourceSpec::new("GJQKYJMD2024", "国际期刊预警名单2024.csv"),
        SourceSpec::new("GJQKYJMD2023", "国际期刊预警名单2023.csv"),
        SourceSpec::new("GJQKYJMD2021", "国际期刊预警名单2021.csv"),
        SourceSpec::new("GJQKYJMD2020", "国际期刊预警名单2020.csv"),
        SourceSpec::new("CCF2022", "CCF推荐国际学术期刊目录2022.csv"),
        SourceSpec::new("CCFT2022", "计算领域高质量科技期刊分级目录2022.csv"),
    ]
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load from an explicit path, else the platform config file, else defaults
    ///
    /// An explicit path that cannot be read is an error; a broken platform
    /// file only logs a warning.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match config_file_path() {
            Some(path) => match Self::load(&path) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    Ok(config)
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Ok(Self::default())
                }
            },
            None => Ok(Self::default()),
        }
    }
}

/// Resolve the root folder following the priority order above
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Location of `jcr.db` under a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// First existing platform config file
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("jcr").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/jcr/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("jcr"))
        .unwrap_or_else(|| PathBuf::from("./jcr_data"))
}
