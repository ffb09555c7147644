//! Layered configuration loading.

use config::{Config, File, FileFormat};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use threadmerge_core::MergeOrdering;
use threadmerge_error::{ConfigError, ConfigErrorKind, ThreadmergeResult};
use threadmerge_security::{PermissionConfig, ValidationConfig};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../threadmerge.toml");

/// Database connection settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string; `DATABASE_URL` overrides it
    #[serde(default)]
    pub url: Option<String>,
}

/// Merge defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    /// Ordering used when a request does not name one
    #[serde(default)]
    pub default_ordering: MergeOrdering,

    /// Enabled optional behaviors, such as `"subscriptions"`
    #[serde(default)]
    pub enabled_extensions: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_ordering: MergeOrdering::default(),
            enabled_extensions: vec![threadmerge_merge::SUBSCRIPTIONS_EXTENSION.to_string()],
        }
    }
}

/// Complete threadmerge configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadmergeConfig {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Merge defaults
    #[serde(default)]
    pub merge: MergeConfig,

    /// Who may merge
    #[serde(default)]
    pub permissions: PermissionConfig,

    /// Mergeability limits
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Message catalog, flattened to dotted keys
    #[serde(default, deserialize_with = "flatten_catalog")]
    pub messages: HashMap<String, String>,
}

/// Catalog tables may nest (`[messages.threadmerge.merge_failed]`) or use
/// quoted dotted keys; both end up as `threadmerge.merge_failed.<step>`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogEntry {
    Text(String),
    Group(HashMap<String, CatalogEntry>),
}

fn flatten_catalog<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn walk(prefix: &str, entries: HashMap<String, CatalogEntry>, out: &mut HashMap<String, String>) {
        for (key, entry) in entries {
            let path = if prefix.is_empty() {
                key
            } else {
                format!("{}.{}", prefix, key)
            };
            match entry {
                CatalogEntry::Text(text) => {
                    out.insert(path, text);
                }
                CatalogEntry::Group(group) => walk(&path, group, out),
            }
        }
    }

    let entries = HashMap::<String, CatalogEntry>::deserialize(deserializer)?;
    let mut out = HashMap::new();
    walk("", entries, &mut out);
    Ok(out)
}

impl ThreadmergeConfig {
    /// Load configuration from a specific file path on top of the bundled
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ThreadmergeResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        Self::build(builder)
    }

    /// Parse configuration from a TOML string on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid configuration.
    pub fn from_toml(contents: &str) -> ThreadmergeResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(contents, FileFormat::Toml));
        Self::build(builder)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (threadmerge.toml shipped with the binary)
    /// 2. User config in home directory (~/.config/threadmerge/threadmerge.toml)
    /// 3. User config in current directory (./threadmerge.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> ThreadmergeResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/threadmerge/threadmerge.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("threadmerge").required(false));
        Self::build(builder)
    }

    /// [`Self::from_file`] when a path is given, [`Self::load`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be read or parsed.
    pub fn load_with(path: Option<&Path>) -> ThreadmergeResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Database connection string: `DATABASE_URL` first, then `[database] url`.
    pub fn database_url(&self) -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| self.database.url.clone())
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ThreadmergeResult<Self> {
        let config = builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Build(e.to_string())))?;
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;

        debug!(
            ordering = %parsed.merge.default_ordering,
            extensions = parsed.merge.enabled_extensions.len(),
            messages = parsed.messages.len(),
            "Configuration loaded"
        );
        Ok(parsed)
    }
}
