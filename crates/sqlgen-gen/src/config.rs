//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `SQLGEN_{PROVIDER}_API_KEY`, `SQLGEN_MODEL`
//! 2. Project-local: `.sqlgen/config.toml`
//! 3. Global: `~/.sqlgen/config.toml`

use serde::{Deserialize, Serialize};
use sqlgen_core::{Language, Result, SqlGenError};
use sqlgen_query::Dialect;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Provider-specific configuration
#[derive(Debug, Clone, Serialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: None,
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Generation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Oracle calls allowed per artifact
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_true")]
    pub refine_requests: bool,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_attempts: default_max_attempts(),
            dialect: Dialect::default(),
            language: Language::default(),
            refine_requests: true,
            temperature: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_max_attempts() -> usize {
    3
}

/// Top-level config file structure
///
/// Every field is optional so that a later layer only overrides what it sets.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    providers: HashMap<String, ProviderOverlay>,
    #[serde(default)]
    generation: GenerationOverlay,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProviderOverlay {
    api_key: Option<String>,
    api_url: Option<String>,
    model: Option<String>,
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenerationOverlay {
    provider: Option<String>,
    max_attempts: Option<usize>,
    dialect: Option<Dialect>,
    language: Option<Language>,
    refine_requests: Option<bool>,
    temperature: Option<f32>,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct SqlGenConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
}

impl SqlGenConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = SqlGenConfig::default();

        // Layer 1: Global config (~/.sqlgen/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 2: Project-local config (.sqlgen/config.toml)
        let local_path = PathBuf::from(".sqlgen/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            config.merge(local);
        }

        // Layer 3: Environment variable overrides
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.check()?;
        Ok(config)
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = SqlGenConfig::default();
        config.merge(Self::load_file(path)?);
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.check()?;
        Ok(config)
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
    }

    /// Get API URL for a provider
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    /// Get the model name configured for a provider
    pub fn model(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.model.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sqlgen").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            SqlGenError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, overlay: ConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = self.providers.entry(name).or_default();
            if provider.api_key.is_some() {
                entry.api_key = provider.api_key;
            }
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            if provider.model.is_some() {
                entry.model = provider.model;
            }
            if let Some(enabled) = provider.enabled {
                entry.enabled = enabled;
            }
        }

        let generation = overlay.generation;
        let base = &mut self.generation;
        if let Some(provider) = generation.provider {
            base.provider = provider;
        }
        if let Some(max_attempts) = generation.max_attempts {
            base.max_attempts = max_attempts;
        }
        if let Some(dialect) = generation.dialect {
            base.dialect = dialect;
        }
        if let Some(language) = generation.language {
            base.language = language;
        }
        if let Some(refine) = generation.refine_requests {
            base.refine_requests = refine;
        }
        if generation.temperature.is_some() {
            base.temperature = generation.temperature;
        }
    }

    /// Apply `SQLGEN_*` variables as returned by `lookup`
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in crate::providers::available_providers() {
            let env_key = format!("SQLGEN_{}_API_KEY", name.to_uppercase());
            if let Some(key) = lookup(&env_key) {
                let entry = self.providers.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
        }
        if let Some(model) = lookup("SQLGEN_MODEL") {
            let provider = self.generation.provider.clone();
            self.providers.entry(provider).or_default().model = Some(model);
        }
    }

    fn check(&self) -> Result<()> {
        if self.generation.max_attempts == 0 {
            return Err(SqlGenError::Config(
                "generation.max_attempts must be at least 1".to_string(),
            ));
        }
        if let Some(t) = self.generation.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(SqlGenError::Config(format!(
                    "generation.temperature must be between 0 and 2, got {}",
                    t
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sqlgen_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        std::fs::remove_file(path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_config_from_file() {
        let config_str = r#"
[providers.openai]
api_url = "https://llm.example.com/v1/chat/completions"
model = "gpt-test"

[providers.mock]
enabled = false

[generation]
provider = "mock"
max_attempts = 5
dialect = "sqlite"
language = "it"
refine_requests = false
"#;
        let path = temp_config(config_str);
        let config = SqlGenConfig::load_from_file(&path).unwrap();

        assert!(config.is_enabled("openai"));
        assert!(!config.is_enabled("mock"));
        assert_eq!(
            config.api_url("openai"),
            Some("https://llm.example.com/v1/chat/completions")
        );
        assert_eq!(config.generation.provider, "mock");
        assert_eq!(config.generation.max_attempts, 5);
        assert_eq!(config.generation.dialect, Dialect::Sqlite);
        assert_eq!(config.generation.language, Language::It);
        assert!(!config.generation.refine_requests);

        cleanup(&path);
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_var_override() {
        let mut config = SqlGenConfig::default();
        config.merge(toml::from_str("[providers.openai]\napi_key = \"file-key\"\nmodel = \"file-model\"").unwrap());

        config.apply_env_overrides(env(&[("SQLGEN_OPENAI_API_KEY", "env-key-override")]));
        assert_eq!(config.api_key("openai"), Some("env-key-override"));
        assert_eq!(config.model("openai"), Some("file-model"));

        config.apply_env_overrides(env(&[("SQLGEN_MODEL", "env-model")]));
        assert_eq!(config.api_key("openai"), Some("env-key-override"));
        assert_eq!(config.model("openai"), Some("env-model"));
    }

    #[test]
    fn test_project_layer_keeps_global_disable() {
        let mut config = SqlGenConfig::default();
        config.merge(toml::from_str("[providers.openai]\nenabled = false").unwrap());
        config.merge(toml::from_str("[providers.openai]\nmodel = \"gpt-project\"").unwrap());
        assert!(!config.is_enabled("openai"));
        assert_eq!(config.model("openai"), Some("gpt-project"));

        config.merge(toml::from_str("[providers.openai]\nenabled = true").unwrap());
        assert!(config.is_enabled("openai"));
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let mut config = SqlGenConfig::default();
        config.merge(toml::from_str("[generation]\nmax_attempts = 7\nlanguage = \"it\"").unwrap());
        config.merge(toml::from_str("[generation]\nrefine_requests = false").unwrap());

        assert_eq!(config.generation.max_attempts, 7);
        assert_eq!(config.generation.language, Language::It);
        assert!(!config.generation.refine_requests);
        assert_eq!(config.generation.provider, "openai");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let path = temp_config("[generation]\nmax_attempts = 0\n");
        let err = SqlGenConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, SqlGenError::Config(_)));
        cleanup(&path);
    }

    #[test]
    fn test_defaults() {
        let config = SqlGenConfig::default();
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.generation.dialect, Dialect::Postgres);
        assert!(config.generation.refine_requests);
        assert_eq!(config.api_key("nonexistent"), None);
        assert!(config.is_enabled("nonexistent"));
    }
}
