//! Oracle registry
//!
//! Maps provider names to concrete implementations.

pub mod mock;
pub mod openai;

use crate::config::SqlGenConfig;
use crate::oracle::GenerationOracle;
use sqlgen_core::{Result, SqlGenError};

/// Create an oracle by name with configuration
pub fn create_oracle(name: &str, config: &SqlGenConfig) -> Result<Box<dyn GenerationOracle>> {
    if !config.is_enabled(name) {
        return Err(SqlGenError::Config(format!(
            "Provider '{}' is disabled in the configuration",
            name
        )));
    }
    match name {
        "mock" => Ok(Box::new(mock::MockOracle::new())),
        "openai" => Ok(Box::new(openai::OpenAiOracle::from_config(config)?)),
        _ => Err(SqlGenError::Config(format!(
            "Unknown provider '{}'. Available: {}",
            name,
            available_providers().join(", ")
        ))),
    }
}

/// List all available provider names
pub fn available_providers() -> Vec<&'static str> {
    vec!["mock", "openai"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock() {
        let oracle = create_oracle("mock", &SqlGenConfig::default()).unwrap();
        assert_eq!(oracle.name(), "mock");
    }

    #[test]
    fn test_unknown_provider() {
        let err = match create_oracle("nope", &SqlGenConfig::default()) {
            Err(e) => e,
            Ok(_) => panic!("called `Result::unwrap_err()` on an `Ok` value"),
        };
        assert!(err.to_string().contains("Available: mock, openai"));
    }

    #[test]
    fn test_disabled_provider() {
        let mut config = SqlGenConfig::default();
        config.providers.insert(
            "mock".to_string(),
            crate::config::ProviderConfig {
                enabled: false,
                ..Default::default()
            },
        );
        assert!(create_oracle("mock", &config).is_err());
    }
}
