//! Application configuration management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger source configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Statement generation options.
    #[serde(default)]
    pub bilan: BilanConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
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

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Ledger source configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// Where ledger files are fetched from.
    #[serde(default)]
    pub source: SourceConfig,
}

/// Ledger file backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Local filesystem, one directory per project.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, MinIO
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Files API serving a per-project file index and the raw files.
    Http {
        /// Base URL, e.g. `http://localhost:3001/api`.
        base_url: String,
        /// Request timeout in seconds.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::LocalFs {
            root: PathBuf::from("./data"),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Statement generation options.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BilanConfig {
    /// How payables rows are accumulated.
    #[serde(default)]
    pub debt_policy: DebtPolicy,
}

/// Accumulation policy for the payables ("Dettes") pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtPolicy {
    /// Classify every row on its own and skip null amounts.
    #[default]
    Corrected,
    /// Reproduce the historical accumulation: null amounts count as zero,
    /// "Autres dettes" only receives the last processed row, and that row's
    /// amount alone is the payables total.
    Legacy,
}

impl std::fmt::Display for DebtPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrected => write!(f, "corrected"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

impl std::str::FromStr for DebtPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "corrected" => Ok(Self::Corrected),
            "legacy" => Ok(Self::Legacy),
            _ => Err(format!("unknown debt policy: {s}")),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BILAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
