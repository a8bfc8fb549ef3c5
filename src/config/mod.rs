// Dispatcher configuration: vendor presets, API keys and layered settings

pub mod merger;
pub mod providers;
pub mod secrets;

pub use merger::{ConfigMerger, PartialConfig, PartialDispatchConfig, PartialServerConfig};
pub use providers::{AuthStyle, Candidate, Vendor, VendorInfo, VendorPreset};
pub use secrets::{remove_token_in, resolve_api_key, store_token_in, SecretsConfig};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings that drive prompt delivery and the fallback sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchConfig {
    pub vendor: Vendor,
    /// Override for the vendor's base URL (proxies, fake endpoints in tests)
    pub base_url: Option<String>,
    /// Ordered candidates; empty means the vendor preset's defaults
    pub candidates: Vec<Candidate>,
    pub temperature: f32,
    /// Token ceiling for create/refine responses
    pub max_output_tokens: u32,
    /// Token ceiling for chat responses
    pub chat_max_output_tokens: u32,
    pub attempt_timeout_secs: u64,
    pub deadline_secs: u64,
    /// Unparseable replies up to this many characters are treated as conversation
    pub short_reply_chars: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            vendor: Vendor::Gemini,
            base_url: None,
            candidates: Vec::new(),
            temperature: 0.7,
            max_output_tokens: 8192,
            chat_max_output_tokens: 1024,
            attempt_timeout_secs: 45,
            deadline_secs: 120,
            short_reply_chars: 400,
        }
    }
}

impl DispatchConfig {
    pub fn effective_candidates(&self) -> Vec<Candidate> {
        if self.candidates.is_empty() {
            self.vendor.preset().default_candidates()
        } else {
            self.candidates.clone()
        }
    }

    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.vendor.preset().base_url.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8888,
            cors_origins: Vec::new(),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VextConfig {
    pub dispatch: DispatchConfig,
    pub server: ServerConfig,
}

/// Global VEXT directory (~/.vext)
pub fn get_global_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".vext"))
}

/// Read a partial config file; a missing file yields None
pub fn load_partial_config(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    let config: PartialConfig = toml::from_str(&contents)
        .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

    Ok(Some(config))
}

/// Load the layered configuration: defaults, ~/.vext/config.toml, an explicit file, CLI overrides
pub fn load_config(explicit: Option<&Path>, cli: Option<PartialConfig>) -> Result<VextConfig> {
    let global = match get_global_config_dir() {
        Some(dir) => load_partial_config(&dir.join("config.toml"))?,
        None => None,
    };

    let file = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
            load_partial_config(path)?
        }
        None => None,
    };

    Ok(ConfigMerger::new()
        .with_global(global)
        .with_file(file)
        .with_cli(cli)
        .merge())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_effective_candidates_defaults_to_preset() {
        let config = DispatchConfig::default();
        assert_eq!(
            config.effective_candidates(),
            Vendor::Gemini.preset().default_candidates()
        );
    }

    #[test]
    fn test_effective_candidates_injected_list_wins() {
        let config = DispatchConfig {
            candidates: vec![Candidate::new("v1", "only-model")],
            ..Default::default()
        };
        assert_eq!(config.effective_candidates().len(), 1);
        assert_eq!(config.effective_candidates()[0].model, "only-model");
    }

    #[test]
    fn test_effective_base_url_trims_slash() {
        let config = DispatchConfig {
            base_url: Some("http://127.0.0.1:9000/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.effective_base_url(), "http://127.0.0.1:9000");

        let config = DispatchConfig {
            vendor: Vendor::Anthropic,
            ..Default::default()
        };
        assert_eq!(config.effective_base_url(), "https://api.anthropic.com");
    }

    #[test]
    fn test_load_partial_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[dispatch]
vendor = "groq"
attempt_timeout_secs = 10

[[dispatch.candidates]]
api_version = "v1"
model = "llama-3.1-8b-instant"

[server]
port = 9090
"#,
        )
        .unwrap();

        let partial = load_partial_config(&path).unwrap().unwrap();
        let config = ConfigMerger::new().with_file(Some(partial)).merge();

        assert_eq!(config.dispatch.vendor, Vendor::Groq);
        assert_eq!(config.dispatch.attempt_timeout_secs, 10);
        assert_eq!(config.dispatch.candidates.len(), 1);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind, "127.0.0.1");
    }

    #[test]
    fn test_load_partial_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_partial_config(&temp_dir.path().join("nope.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_partial_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "dispatch = [not toml").unwrap();
        assert!(load_partial_config(&path).is_err());
    }
}
