//! Exercise tiers and description languages

use crate::error::SqlGenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal difficulty tier controlling constraint thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SqlGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(SqlGenError::Config(format!(
                "Unknown difficulty '{}'. Expected one of: easy, medium, hard",
                other
            ))),
        }
    }
}

/// Language used for constraint descriptions, prompts and feedback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

impl Language {
    /// Name of the language as it should appear inside an English prompt
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::It => "Italian",
        }
    }

    /// Pick the text matching this language
    pub fn pick<'a>(&self, en: &'a str, it: &'a str) -> &'a str {
        match self {
            Language::En => en,
            Language::It => it,
        }
    }
}

impl FromStr for Language {
    type Err = SqlGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "it" | "italian" => Ok(Language::It),
            other => Err(SqlGenError::Config(format!(
                "Unknown language '{}'. Expected 'en' or 'it'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_ordering() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_language_pick() {
        assert_eq!(Language::It.pick("table", "tabella"), "tabella");
        assert_eq!(Language::default(), Language::En);
        assert_eq!("italian".parse::<Language>().unwrap(), Language::It);
    }
}
