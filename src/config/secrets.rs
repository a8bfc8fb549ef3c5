// API key resolution for the vendor clients
//
// The process environment wins. Keys can also live in ~/.vext/secrets.toml
// (global only); that file is written with owner-only permissions.

use super::providers::Vendor;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Secrets stored in ~/.vext/secrets.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    /// API keys indexed by vendor ID (e.g., "gemini" -> "AIza...")
    #[serde(default)]
    pub api_tokens: HashMap<String, String>,
}

impl SecretsConfig {
    /// Get the secrets file path (~/.vext/secrets.toml)
    pub fn get_secrets_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".vext").join("secrets.toml"))
    }

    /// Load secrets from the default location
    pub fn load() -> Result<Self> {
        let path = Self::get_secrets_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Self::load_from(&path)
    }

    /// Load secrets from a specific file; a missing file yields no secrets
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read secrets file '{}': {}", path.display(), e))?;

        toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse secrets file '{}': {}", path.display(), e))
    }

    /// Save secrets to a specific file with restrictive permissions
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!(
                        "Failed to create secrets directory '{}': {}",
                        parent.display(),
                        e
                    )
                })?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize secrets: {}", e))?;

        fs::write(path, contents)
            .map_err(|e| anyhow!("Failed to write secrets file '{}': {}", path.display(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions).map_err(|e| {
                anyhow!(
                    "Failed to set permissions on secrets file '{}': {}",
                    path.display(),
                    e
                )
            })?;
        }

        log::info!("Saved secrets to: {}", path.display());
        Ok(())
    }

    pub fn get_token(&self, vendor: Vendor) -> Option<&String> {
        self.api_tokens.get(vendor.as_str())
    }

    pub fn set_token(&mut self, vendor: Vendor, token: &str) {
        self.api_tokens
            .insert(vendor.as_str().to_string(), token.to_string());
    }

    pub fn delete_token(&mut self, vendor: Vendor) -> bool {
        self.api_tokens.remove(vendor.as_str()).is_some()
    }
}

/// Store a vendor's API key in the secrets file at `path`
pub fn store_token_in(path: &Path, vendor: Vendor, token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(anyhow!("Refusing to store an empty API key for {}", vendor));
    }

    let mut secrets = SecretsConfig::load_from(path)?;
    secrets.set_token(vendor, token);
    secrets.save_to(path)?;

    log::info!("Stored API key for {}", vendor);
    Ok(())
}

/// Remove a vendor's API key; returns false when none was stored
pub fn remove_token_in(path: &Path, vendor: Vendor) -> Result<bool> {
    let mut secrets = SecretsConfig::load_from(path)?;
    if !secrets.delete_token(vendor) {
        return Ok(false);
    }
    secrets.save_to(path)?;

    log::info!("Deleted API key for {}", vendor);
    Ok(true)
}

/// Resolve the API key for a vendor: environment variable first, then the secrets file.
/// Blank values count as absent.
pub fn resolve_api_key(vendor: Vendor, secrets: &SecretsConfig) -> Option<String> {
    let from_env = std::env::var(vendor.preset().key_env)
        .ok()
        .filter(|v| !v.trim().is_empty());

    from_env.or_else(|| {
        secrets
            .get_token(vendor)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_secrets_config_default() {
        let config = SecretsConfig::default();
        assert!(config.api_tokens.is_empty());
    }

    #[test]
    fn test_set_get_delete_token() {
        let mut config = SecretsConfig::default();
        config.set_token(Vendor::Groq, "gsk-test");
        assert_eq!(config.get_token(Vendor::Groq), Some(&"gsk-test".to_string()));
        assert!(config.get_token(Vendor::Gemini).is_none());

        assert!(config.delete_token(Vendor::Groq));
        assert!(!config.delete_token(Vendor::Groq));
    }

    #[test]
    fn test_save_and_load_roundtrip_in_temp_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("secrets.toml");

        let mut config = SecretsConfig::default();
        config.set_token(Vendor::Anthropic, "sk-ant-123");
        config.save_to(&path).unwrap();

        let loaded = SecretsConfig::load_from(&path).unwrap();
        assert_eq!(
            loaded.get_token(Vendor::Anthropic),
            Some(&"sk-ant-123".to_string())
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_store_and_remove_token_in_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secrets.toml");

        store_token_in(&path, Vendor::OpenAi, "  sk-openai  ").unwrap();
        store_token_in(&path, Vendor::Gemini, "AIza-test").unwrap();

        let loaded = SecretsConfig::load_from(&path).unwrap();
        assert_eq!(loaded.get_token(Vendor::OpenAi), Some(&"sk-openai".to_string()));
        assert_eq!(loaded.get_token(Vendor::Gemini), Some(&"AIza-test".to_string()));

        assert!(remove_token_in(&path, Vendor::OpenAi).unwrap());
        assert!(!remove_token_in(&path, Vendor::OpenAi).unwrap());

        let loaded = SecretsConfig::load_from(&path).unwrap();
        assert!(loaded.get_token(Vendor::OpenAi).is_none());
        assert!(loaded.get_token(Vendor::Gemini).is_some());
    }

    #[test]
    fn test_store_rejects_blank_token() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secrets.toml");
        assert!(store_token_in(&path, Vendor::Groq, "   ").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = SecretsConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert!(loaded.api_tokens.is_empty());
    }

    #[test]
    fn test_resolve_falls_back_to_secrets_file() {
        // GROQ_API_KEY is not expected in the test environment
        if std::env::var("GROQ_API_KEY").is_ok() {
            return;
        }
        let mut config = SecretsConfig::default();
        assert!(resolve_api_key(Vendor::Groq, &config).is_none());

        config.set_token(Vendor::Groq, "   ");
        assert!(resolve_api_key(Vendor::Groq, &config).is_none());

        config.set_token(Vendor::Groq, "gsk-file");
        assert_eq!(
            resolve_api_key(Vendor::Groq, &config),
            Some("gsk-file".to_string())
        );
    }
}
