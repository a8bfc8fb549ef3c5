// Configuration merging with priority

use super::providers::{Candidate, Vendor};
use super::{DispatchConfig, ServerConfig, VextConfig};
use serde::{Deserialize, Serialize};

/// Partial configuration for merging
/// Uses Option<T> for all fields to support partial overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialConfig {
    #[serde(default)]
    pub dispatch: Option<PartialDispatchConfig>,
    #[serde(default)]
    pub server: Option<PartialServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialDispatchConfig {
    pub vendor: Option<Vendor>,
    pub base_url: Option<String>,
    pub candidates: Option<Vec<Candidate>>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub chat_max_output_tokens: Option<u32>,
    pub attempt_timeout_secs: Option<u64>,
    pub deadline_secs: Option<u64>,
    pub short_reply_chars: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub cors_origins: Option<Vec<String>>,
}

/// Configuration merger
/// Priority order: CLI -> explicit file -> Global -> Defaults
pub struct ConfigMerger {
    defaults: VextConfig,
    global: Option<PartialConfig>,
    file: Option<PartialConfig>,
    cli: Option<PartialConfig>,
}

impl ConfigMerger {
    /// Create a new config merger with defaults
    pub fn new() -> Self {
        Self {
            defaults: VextConfig::default(),
            global: None,
            file: None,
            cli: None,
        }
    }

    /// Set global config (~/.vext/config.toml)
    pub fn with_global(mut self, config: Option<PartialConfig>) -> Self {
        self.global = config;
        self
    }

    /// Set config from an explicit --config file
    pub fn with_file(mut self, config: Option<PartialConfig>) -> Self {
        self.file = config;
        self
    }

    /// Set CLI overrides
    pub fn with_cli(mut self, config: Option<PartialConfig>) -> Self {
        self.cli = config;
        self
    }

    /// Merge all layers with priority
    pub fn merge(&self) -> VextConfig {
        let mut result = self.defaults.clone();

        for layer in [&self.global, &self.file, &self.cli].into_iter().flatten() {
            result = self.merge_partial(&result, layer);
        }

        result
    }

    fn merge_partial(&self, base: &VextConfig, partial: &PartialConfig) -> VextConfig {
        VextConfig {
            dispatch: partial
                .dispatch
                .as_ref()
                .map(|p| self.merge_partial_dispatch(&base.dispatch, p))
                .unwrap_or_else(|| base.dispatch.clone()),
            server: partial
                .server
                .as_ref()
                .map(|p| self.merge_partial_server(&base.server, p))
                .unwrap_or_else(|| base.server.clone()),
        }
    }

    fn merge_partial_dispatch(
        &self,
        base: &DispatchConfig,
        partial: &PartialDispatchConfig,
    ) -> DispatchConfig {
        // Switching vendor without naming candidates drops the old vendor's list
        let vendor_changed = partial.vendor.map(|v| v != base.vendor).unwrap_or(false);
        let base_candidates = if vendor_changed {
            Vec::new()
        } else {
            base.candidates.clone()
        };
        let base_url = if vendor_changed {
            None
        } else {
            base.base_url.clone()
        };

        DispatchConfig {
            vendor: partial.vendor.unwrap_or(base.vendor),
            base_url: partial.base_url.clone().or(base_url),
            candidates: partial.candidates.clone().unwrap_or(base_candidates),
            temperature: partial.temperature.unwrap_or(base.temperature),
            max_output_tokens: partial.max_output_tokens.unwrap_or(base.max_output_tokens),
            chat_max_output_tokens: partial
                .chat_max_output_tokens
                .unwrap_or(base.chat_max_output_tokens),
            attempt_timeout_secs: partial
                .attempt_timeout_secs
                .unwrap_or(base.attempt_timeout_secs),
            deadline_secs: partial.deadline_secs.unwrap_or(base.deadline_secs),
            short_reply_chars: partial.short_reply_chars.unwrap_or(base.short_reply_chars),
        }
    }

    fn merge_partial_server(
        &self,
        base: &ServerConfig,
        partial: &PartialServerConfig,
    ) -> ServerConfig {
        ServerConfig {
            bind: partial.bind.clone().unwrap_or_else(|| base.bind.clone()),
            port: partial.port.unwrap_or(base.port),
            cors_origins: partial
                .cors_origins
                .clone()
                .unwrap_or_else(|| base.cors_origins.clone()),
        }
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}
