// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Service Configuration Types
//
// Defines the configuration schema for a Vigil node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP bind address and port
// - Storage backend selection (in-memory or PostgreSQL)
// - Bearer token verification secret
// - Logging settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const API_VERSION: &str = "vigil.dev/v1";
pub const KIND: &str = "ServiceConfig";
pub const JWT_SECRET_ENV: &str = "VIGIL_JWT_SECRET";

/// Top-level Kubernetes-style service configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfigManifest {
    /// API version (must be "vigil.dev/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ServiceConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: ServiceConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable node name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfigSpec {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,

    /// PostgreSQL connection string (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::InMemory,
            connection_string: None,
            max_connections: default_max_connections(),
        }
    }
}

impl StorageConfig {
    pub fn to_backend(&self) -> anyhow::Result<StorageBackend> {
        match self.backend {
            StorageKind::InMemory => Ok(StorageBackend::InMemory),
            StorageKind::Postgres => {
                let raw = self
                    .connection_string
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("spec.storage.connection_string is required for the postgres backend"))?;
                Ok(StorageBackend::PostgreSQL(PostgresConfig {
                    connection_string: resolve_value(raw)?,
                    max_connections: self.max_connections,
                }))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to verify bearer tokens (supports "env:VAR_NAME")
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Clock skew tolerated when checking token expiry
    #[serde(default = "default_leeway_seconds")]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            leeway_seconds: default_leeway_seconds(),
        }
    }
}

impl AuthConfig {
    pub fn resolve_secret(&self) -> anyhow::Result<String> {
        let secret = resolve_value(&self.jwt_secret)?;
        if secret.is_empty() {
            anyhow::bail!("spec.auth.jwt_secret resolves to an empty value");
        }
        Ok(secret)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (e.g., "info", "vigil_core=debug")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServiceConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "vigil-node".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: ServiceConfigSpec::default(),
        }
    }
}

impl ServiceConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. VIGIL_CONFIG_PATH environment variable
    /// 2. ./vigil-config.yaml (working directory)
    /// 3. ~/.vigil/config.yaml (user home)
    /// 4. /etc/vigil/config.yaml (Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("VIGIL_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./vigil-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vigil").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/vigil/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Container deployments override secrets, storage and port through env
    /// vars: `VIGIL_JWT_SECRET`, `VIGIL_DATABASE_URL`, `VIGIL_PORT`.
    pub fn apply_env_overrides(&mut self) {
        if std::env::var_os(JWT_SECRET_ENV).is_some() {
            // resolved at startup so the secret never sits in the manifest
            tracing::info!("Environment override: {}", JWT_SECRET_ENV);
            self.spec.auth.jwt_secret = format!("env:{}", JWT_SECRET_ENV);
        }

        if let Ok(url) = std::env::var("VIGIL_DATABASE_URL") {
            tracing::info!("Environment override: VIGIL_DATABASE_URL (postgres backend)");
            self.spec.storage.backend = StorageKind::Postgres;
            self.spec.storage.connection_string = Some(url);
        }

        if let Ok(port) = std::env::var("VIGIL_PORT") {
            match port.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: VIGIL_PORT={}", port);
                    self.spec.network.port = port;
                }
                Err(_) => tracing::warn!("Invalid value for VIGIL_PORT: '{}'. Ignoring.", port),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!("Invalid apiVersion: '{}'. Must be '{}'", self.api_version, API_VERSION);
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.network.port == 0 {
            anyhow::bail!("spec.network.port cannot be 0");
        }

        if self.spec.storage.backend == StorageKind::Postgres
            && self.spec.storage.connection_string.as_deref().is_none_or(str::is_empty)
        {
            anyhow::bail!("spec.storage.connection_string is required for the postgres backend");
        }

        if self.spec.storage.max_connections == 0 {
            anyhow::bail!("spec.storage.max_connections must be at least 1");
        }

        if self.spec.auth.jwt_secret.is_empty() {
            anyhow::bail!("spec.auth.jwt_secret cannot be empty");
        }

        let format = self.spec.observability.logging.format.as_str();
        if format != "text" && format != "json" {
            anyhow::bail!("Invalid logging format: '{}'. Expected 'text' or 'json'", format);
        }

        Ok(())
    }
}

/// Resolves "env:VAR_NAME" indirection; other values are returned as is.
fn resolve_value(raw: &str) -> anyhow::Result<String> {
    match raw.strip_prefix("env:") {
        Some(var) => std::env::var(var)
            .map_err(|_| anyhow::anyhow!("Environment variable '{}' is not set", var)),
        None => Ok(raw.to_string()),
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_max_connections() -> u32 {
    5
}

fn default_jwt_secret() -> String {
    format!("env:{}", JWT_SECRET_ENV)
}

fn default_leeway_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_manifest() {
        let manifest = ServiceConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, KIND);
        assert_eq!(manifest.spec.network.port, 8000);
        assert_eq!(manifest.spec.storage.backend, StorageKind::InMemory);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_yaml_uses_defaults() {
        let yaml = r#"
apiVersion: vigil.dev/v1
kind: ServiceConfig
metadata:
  name: soc-east
spec:
  storage:
    backend: postgres
    connection_string: postgres://vigil@localhost/vigil
  observability:
    logging:
      format: json
"#;
        let manifest = ServiceConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.metadata.name, "soc-east");
        assert_eq!(manifest.spec.network.bind_address, "127.0.0.1");
        assert_eq!(manifest.spec.storage.max_connections, 5);
        assert_eq!(manifest.spec.observability.logging.level, "info");
        assert!(manifest.validate().is_ok());
        assert_eq!(
            manifest.spec.storage.to_backend().unwrap(),
            StorageBackend::PostgreSQL(PostgresConfig {
                connection_string: "postgres://vigil@localhost/vigil".to_string(),
                max_connections: 5,
            })
        );
    }

    #[test]
    fn test_validation() {
        let mut manifest = ServiceConfigManifest::default();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "NodeConfig".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.network.port = 0;
        assert!(manifest.validate().is_err());
        manifest.spec.network.port = 8080;

        manifest.spec.storage.backend = StorageKind::Postgres;
        assert!(manifest.validate().is_err());
        manifest.spec.storage.connection_string = Some("postgres://localhost/vigil".to_string());
        assert!(manifest.validate().is_ok());

        manifest.spec.observability.logging.format = "xml".to_string();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_secret_env_indirection() {
        let auth = AuthConfig {
            jwt_secret: "env:VIGIL_TEST_SECRET_INDIRECTION".to_string(),
            leeway_seconds: 0,
        };
        assert!(auth.resolve_secret().is_err());

        std::env::set_var("VIGIL_TEST_SECRET_INDIRECTION", "s3cret");
        assert_eq!(auth.resolve_secret().unwrap(), "s3cret");

        let literal = AuthConfig {
            jwt_secret: "inline".to_string(),
            leeway_seconds: 0,
        };
        assert_eq!(literal.resolve_secret().unwrap(), "inline");
    }

    #[test]
    fn test_jwt_secret_env_override() {
        let mut manifest = ServiceConfigManifest::default();
        manifest.spec.auth.jwt_secret = "inline-from-file".to_string();

        std::env::set_var(JWT_SECRET_ENV, "from-environment");
        manifest.apply_env_overrides();
        assert_eq!(manifest.spec.auth.jwt_secret, "env:VIGIL_JWT_SECRET");
        assert_eq!(manifest.spec.auth.resolve_secret().unwrap(), "from-environment");
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let missing = PathBuf::from("/nonexistent/vigil-config.yaml");
        assert!(ServiceConfigManifest::load_or_default(Some(missing)).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "apiVersion: vigil.dev/v1\nkind: ServiceConfig\nmetadata:\n  name: from-file\n").unwrap();
        let loaded = ServiceConfigManifest::load_or_default(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(loaded.metadata.name, "from-file");
    }
}
