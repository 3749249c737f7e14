//! Persisted provider configuration.
//!
//! The host that embeds the provider owns persistence; this type is the
//! plain-data form it stores, with TOML loading for standalone use.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConnectionSettings, VaultError};

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Provider configuration as persisted by the host.
///
/// ```toml
/// host = "vault.example.com"
/// username = "build"
/// password = "secret"
/// use_ssl = true
/// client_path = "/opt/vault/vault"
/// mask_password = true
/// ```
pub struct ProviderConfig {
    /// Vault server host name.
    pub host: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Whether to connect over SSL.
    pub use_ssl: bool,
    /// Optional explicit path to the client executable.
    pub client_path: Option<PathBuf>,
    /// Whether to mask the password in logs.
    pub mask_password: bool,
}

impl ProviderConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, VaultError> {
        toml::from_str(text).map_err(|err| VaultError::Config(err.to_string()))
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VaultError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            VaultError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, VaultError> {
        toml::to_string(self).map_err(|err| VaultError::Config(err.to_string()))
    }

    /// Checks that the required connection fields are present.
    pub fn validate(&self) -> Result<(), VaultError> {
        let missing: Vec<&str> = [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(VaultError::Config(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }
        if let Some(path) = &self.client_path
            && path.as_os_str().is_empty()
        {
            return Err(VaultError::Config("client_path is empty".into()));
        }
        Ok(())
    }

    /// Converts the configuration into connection settings.
    pub fn to_connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            use_ssl: self.use_ssl,
            client_path: self
                .client_path
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            mask_password: self.mask_password,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("use_ssl", &self.use_ssl)
            .field("client_path", &self.client_path)
            .field("mask_password", &self.mask_password)
            .finish_non_exhaustive()
    }
}
