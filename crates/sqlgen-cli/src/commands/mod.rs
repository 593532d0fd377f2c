//! CLI command implementations

pub mod check;
pub mod generate;
pub mod misconceptions;

use anyhow::{Context, Result};
use sqlgen_constraint::MisconceptionRegistry;
use sqlgen_core::Difficulty;

/// Built-in misconceptions, extended by an optional user file
pub fn load_registry(extra: Option<&str>) -> Result<MisconceptionRegistry> {
    let mut registry = MisconceptionRegistry::builtin()?;
    if let Some(path) = extra {
        registry
            .load_file(path)
            .with_context(|| format!("loading misconceptions from {}", path))?;
    }
    Ok(registry)
}

/// Parse `id` or `id:difficulty`; the difficulty defaults to medium
pub fn parse_pick(s: &str) -> Result<(String, Difficulty), String> {
    let (id, difficulty) = match s.split_once(':') {
        Some((id, level)) => (id, level.parse().map_err(|e| format!("{}", e))?),
        None => (s, Difficulty::Medium),
    };
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing misconception id in '{}'", s));
    }
    Ok((id.to_string(), difficulty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pick() {
        assert_eq!(
            parse_pick("duplicate_rows:hard").unwrap(),
            ("duplicate_rows".to_string(), Difficulty::Hard)
        );
        assert_eq!(
            parse_pick("missing_join").unwrap(),
            ("missing_join".to_string(), Difficulty::Medium)
        );
        assert!(parse_pick(":easy").is_err());
        assert!(parse_pick("x:impossible").is_err());
    }

    #[test]
    fn test_builtin_registry_loads() {
        assert!(!load_registry(None).unwrap().is_empty());
    }
}
