//! Settings file handling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogError, CatalogRegistry, QueryType};
use crate::compile::CompileOptions;
use crate::schema::Introspect;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Query type not found: {0}")]
    QueryTypeNotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// SQL generation settings.
    pub compiler: CompilerSettings,

    /// Where the entity schema lives.
    pub schema: SchemaSettings,

    /// Log filter used by the CLI.
    pub logging: LoggingSettings,

    /// Named query types, keyed by name.
    pub query_types: BTreeMap<String, QueryTypeSettings>,
}

/// SQL generation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Target dialect.
    pub dialect: Dialect,

    /// Soft-delete column; an empty string disables the check.
    pub soft_delete_column: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            soft_delete_column: "deleted_at".to_string(),
        }
    }
}

/// Schema location.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Path to a schema TOML file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

/// One `[query_types.<name>]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryTypeSettings {
    pub entity: String,
    #[serde(default)]
    pub only: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), query_types = settings.query_types.len(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SIFT_CONFIG`
    /// 2. `./sift.toml`
    /// 3. `~/.config/sift/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("SIFT_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("sift.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sift").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Compiler options from the `[compiler]` section.
    pub fn compile_options(&self) -> CompileOptions {
        let column = self.compiler.soft_delete_column.trim();
        CompileOptions::default()
            .with_dialect(self.compiler.dialect)
            .with_soft_delete_column((!column.is_empty()).then_some(column))
    }

    /// The schema file path with environment variables expanded.
    pub fn schema_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.schema
            .path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    /// Get a query type by name.
    pub fn query_type(&self, name: &str) -> Result<QueryType, SettingsError> {
        let config = self
            .query_types
            .get(name)
            .ok_or_else(|| SettingsError::QueryTypeNotFound(name.to_string()))?;
        if config.entity.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(format!(
                "query type '{}' has no entity",
                name
            )));
        }
        Ok(QueryType::new(name, &config.entity)
            .only(config.only.iter().cloned())
            .exclude(config.exclude.iter().cloned()))
    }

    /// Register every configured query type against `schema`.
    pub fn registry(&self, schema: &dyn Introspect) -> Result<CatalogRegistry, SettingsError> {
        let registry = CatalogRegistry::new();
        for name in self.query_types.keys() {
            registry.register(schema, &self.query_type(name)?)?;
        }
        Ok(registry)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
