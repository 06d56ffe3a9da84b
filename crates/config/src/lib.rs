use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "saferoof.toml",
    "config/saferoof.toml",
    "crates/config/saferoof.toml",
    "../saferoof.toml",
    "../config/saferoof.toml",
    "../crates/config/saferoof.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://saferoof.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Settings for the JWT auth guard.
///
/// ```
/// use saferoof_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.token_ttl_seconds, 7 * 24 * 60 * 60);
/// assert_eq!(auth.issuer, "saferoof");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_secret")]
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
    #[serde(default = "AuthConfig::default_audience")]
    pub audience: String,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Self::default_secret(),
            issuer: Self::default_issuer(),
            audience: Self::default_audience(),
            token_ttl_seconds: Self::default_token_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_secret() -> String {
        "change_me_in_production".to_string()
    }

    fn default_issuer() -> String {
        "saferoof".to_string()
    }

    fn default_audience() -> String {
        "saferoof-web".to_string()
    }

    const fn default_token_ttl() -> u64 {
        7 * 24 * 60 * 60
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "UploadsConfig::default_directory")]
    pub directory: String,
    #[serde(default = "UploadsConfig::default_max_images")]
    pub max_images: usize,
    #[serde(default = "UploadsConfig::default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            max_images: Self::default_max_images(),
            max_image_bytes: Self::default_max_image_bytes(),
        }
    }
}

impl UploadsConfig {
    fn default_directory() -> String {
        "uploads".to_string()
    }

    const fn default_max_images() -> usize {
        5
    }

    const fn default_max_image_bytes() -> usize {
        5 * 1024 * 1024
    }
}

/// Optional directory holding the built single-page frontend. When unset the
/// gateway serves the API only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticFilesConfig {
    #[serde(default)]
    pub directory: Option<String>,
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use saferoof_config::load;
///
/// std::env::remove_var("SAFEROOF_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())
        .unwrap()
        .set_default("auth.issuer", defaults.auth.issuer.clone())
        .unwrap()
        .set_default("auth.audience", defaults.auth.audience.clone())
        .unwrap()
        .set_default(
            "auth.token_ttl_seconds",
            i64::try_from(defaults.auth.token_ttl_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("uploads.directory", defaults.uploads.directory.clone())
        .unwrap()
        .set_default("uploads.max_images", defaults.uploads.max_images as i64)
        .unwrap()
        .set_default(
            "uploads.max_image_bytes",
            defaults.uploads.max_image_bytes as i64,
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("SAFEROOF").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("SAFEROOF_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via SAFEROOF_CONFIG");
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

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
