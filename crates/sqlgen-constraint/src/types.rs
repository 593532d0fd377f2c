//! Parameter types shared by schema and query constraints

use serde::{Deserialize, Serialize};
use sqlgen_core::Language;

/// Common interface of every constraint variant
pub trait Constraint {
    /// Snake-case variant name, identical to the serde tag
    fn name(&self) -> &'static str;

    /// Requirement text, used both as prompt instruction and as feedback
    fn description(&self, language: Language) -> String;
}

/// Whether a clause must appear or must not appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Present,
    Absent,
}

impl Presence {
    pub fn holds(&self, present: bool) -> bool {
        match self {
            Presence::Present => present,
            Presence::Absent => !present,
        }
    }

    pub(crate) fn word(&self, language: Language) -> &'static str {
        match self {
            Presence::Present => language.pick("must", "deve"),
            Presence::Absent => language.pick("must not", "non deve"),
        }
    }
}

/// Shape required of the subqueries of a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nesting {
    #[default]
    Any,
    /// No subquery inside another subquery
    Flat,
    /// At least one subquery inside another subquery
    Nested,
}

/// Required behavior of the result set with respect to duplicate rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMode {
    /// The result may contain duplicate rows
    Allowed,
    /// The result is guaranteed to contain no duplicate rows
    Unique,
    /// DISTINCT is used and without it duplicates would occur
    DistinctRequired,
}

/// Whether `value` lies in `[min, max]`; a missing max is unbounded
pub fn within(value: usize, min: usize, max: Option<usize>) -> bool {
    value >= min && max.map_or(true, |max| value <= max)
}

/// "at least 2", "between 2 and 4", ... in the requested language
pub(crate) fn bound_phrase(language: Language, min: usize, max: Option<usize>) -> String {
    match (min, max) {
        (0, None) => language.pick("any number of", "un numero qualsiasi di").to_string(),
        (min, None) => format!("{} {}", language.pick("at least", "almeno"), min),
        (0, Some(max)) => format!("{} {}", language.pick("at most", "al massimo"), max),
        (min, Some(max)) if min == max => {
            format!("{} {}", language.pick("exactly", "esattamente"), min)
        }
        (min, Some(max)) => format!(
            "{} {} {} {}",
            language.pick("between", "tra"),
            min,
            language.pick("and", "e"),
            max
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within() {
        assert!(within(3, 2, None));
        assert!(within(2, 2, Some(2)));
        assert!(!within(1, 2, None));
        assert!(!within(5, 0, Some(4)));
    }

    #[test]
    fn test_bound_phrase() {
        assert_eq!(bound_phrase(Language::En, 2, None), "at least 2");
        assert_eq!(bound_phrase(Language::En, 0, Some(3)), "at most 3");
        assert_eq!(bound_phrase(Language::En, 2, Some(2)), "exactly 2");
        assert_eq!(bound_phrase(Language::It, 1, Some(3)), "tra 1 e 3");
    }

    #[test]
    fn test_presence() {
        assert!(Presence::Present.holds(true));
        assert!(Presence::Absent.holds(false));
        assert!(!Presence::Absent.holds(true));
    }

    #[test]
    fn test_parse_params_from_toml() {
        #[derive(Deserialize)]
        struct Params {
            state: Presence,
            nesting: Nesting,
            mode: DuplicateMode,
        }
        let params: Params =
            toml::from_str("state = \"absent\"\nnesting = \"flat\"\nmode = \"distinct_required\"")
                .unwrap();
        assert_eq!(params.state, Presence::Absent);
        assert_eq!(params.nesting, Nesting::Flat);
        assert_eq!(params.mode, DuplicateMode::DistinctRequired);
    }
}
