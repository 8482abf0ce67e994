use anyhow::{Context, Result};
use overseer_core::providers::anthropic::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use overseer_core::providers::mask_secret;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverseerConfig {
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".overseer")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl OverseerConfig {
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        Self::load_with(custom_path.as_deref(), &default_config_path(), env_lookup)
    }

    /// Load from `custom_path`, or from `default_path` if it exists, or from the
    /// built-in defaults. `lookup` resolves environment variables.
    fn load_with(
        custom_path: Option<&Path>,
        default_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let (content, source) = match custom_path {
            Some(path) => (read_config(path)?, path.display().to_string()),
            None if default_path.exists() => {
                (read_config(default_path)?, default_path.display().to_string())
            }
            None => {
                debug!(
                    "No config at {}, using built-in defaults",
                    default_path.display()
                );
                (DEFAULT_CONFIG.to_string(), "built-in defaults".to_string())
            }
        };

        if content.contains("sk-ant-") {
            warn!(
                "API key is hardcoded in {}. For security, use environment variables: api_key = \"${{ANTHROPIC_API_KEY}}\"",
                source
            );
        }

        // Expand environment variables before parsing
        let expanded = expand_env_vars(&content, &lookup);

        let mut config: Self = toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config from {}", source))?;

        config.apply_env_overrides(&lookup);
        Ok(config)
    }

    /// `ANTHROPIC_API_KEY` fills an empty key; `ANTHROPIC_MODEL` replaces the model
    fn apply_env_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if self.anthropic.api_key.is_empty() {
            if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
                self.anthropic.api_key = key;
            }
        }
        if let Some(model) = lookup("ANTHROPIC_MODEL").filter(|m| !m.trim().is_empty()) {
            debug!("Model overridden by ANTHROPIC_MODEL: {}", model);
            self.anthropic.model = model.trim().to_string();
        }
    }

    /// Copy safe to print: secrets replaced by their masked form
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.anthropic.api_key = mask_secret(&self.anthropic.api_key);
        masked
    }
}

fn read_config(path: &Path) -> Result<String> {
    // Refuse config files other users can read; they may hold the API key
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                anyhow::bail!(
                    "Config file {} has overly permissive permissions ({:o}). \
                     It may contain secrets. Fix with: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                );
            }
        }
    }

    std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config at {}. Run `overseer init` to create one.",
            path.display()
        )
    })
}

/// Environment variables that may be expanded in config files
const ALLOWED_ENV_VARS: &[&str] = &["ANTHROPIC_API_KEY", "ANTHROPIC_MODEL", "HOME", "USER"];

fn expand_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while pos < result.len() {
        let Some(start) = result[pos..].find("${") else {
            break;
        };
        let abs_start = pos + start;
        let Some(end) = result[abs_start..].find('}') else {
            break;
        };
        let var_name = result[abs_start + 2..abs_start + end].to_string();

        if !ALLOWED_ENV_VARS.contains(&var_name.as_str()) {
            warn!(
                "Skipping expansion of unrecognized env var '{}' in config (not in allowlist)",
                var_name
            );
            pos = abs_start + end + 1;
            continue;
        }

        let value = lookup(&var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..abs_start],
            value,
            &result[abs_start + end + 1..]
        );
        pos = abs_start + value.len();
    }
    result
}
