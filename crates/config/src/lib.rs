use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "duolog.toml",
    "config/duolog.toml",
    "crates/config/duolog.toml",
    "../duolog.toml",
    "../config/duolog.toml",
    "../crates/config/duolog.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://duolog.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_seconds: Self::default_token_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_token_ttl() -> u64 {
        86_400
    }
}

/// Limits applied to uploaded files before their metadata is recorded.
///
/// ```
/// use duolog_config::UploadConfig;
///
/// let uploads = UploadConfig::default();
/// assert_eq!(uploads.max_file_size_bytes, 10 * 1024 * 1024);
/// assert!(uploads.allowed_extensions.iter().any(|ext| ext == "png"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "UploadConfig::default_directory")]
    pub directory: String,
    #[serde(default = "UploadConfig::default_max_file_size")]
    pub max_file_size_bytes: i64,
    #[serde(default = "UploadConfig::default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    fn default_directory() -> String {
        "uploads".to_string()
    }

    const fn default_max_file_size() -> i64 {
        10 * 1024 * 1024
    }

    fn default_allowed_extensions() -> Vec<String> {
        ["txt", "pdf", "doc", "docx", "jpg", "jpeg", "png", "gif"]
            .iter()
            .map(|ext| ext.to_string())
            .collect()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            max_file_size_bytes: Self::default_max_file_size(),
            allowed_extensions: Self::default_allowed_extensions(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use duolog_config::load;
///
/// std::env::remove_var("DUOLOG_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let db_max = defaults.database.max_connections as i64;
    let token_ttl = defaults.auth.token_ttl_seconds;
    let token_ttl_i64 = if token_ttl > i64::MAX as u64 {
        i64::MAX
    } else {
        token_ttl as i64
    };

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default("database.max_connections", db_max)
        .unwrap()
        .set_default("auth.token_ttl_seconds", token_ttl_i64)
        .unwrap()
        .set_default("uploads.directory", defaults.uploads.directory.clone())
        .unwrap()
        .set_default(
            "uploads.max_file_size_bytes",
            defaults.uploads.max_file_size_bytes,
        )
        .unwrap()
        .set_default(
            "uploads.allowed_extensions",
            defaults.uploads.allowed_extensions.clone(),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("DUOLOG").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("DUOLOG_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via DUOLOG_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    Ok(config)
}
