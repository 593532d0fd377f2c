//! Validation report types

use sqlgen_core::{ConstraintViolation, Language};

/// Every violation found while validating one artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<ConstraintViolation>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: ConstraintViolation) {
        self.violations.push(violation);
    }

    /// Record the outcome of one constraint check
    pub fn record(&mut self, outcome: Result<(), ConstraintViolation>) {
        if let Err(violation) = outcome {
            self.push(violation);
        }
    }

    /// Check if the artifact satisfied every constraint
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        match self.violations.len() {
            0 => "All constraints satisfied.".to_string(),
            n => {
                let names: Vec<&str> = self
                    .violations
                    .iter()
                    .map(|v| v.constraint.as_str())
                    .collect();
                format!("{} violation(s): {}", n, names.join(", "))
            }
        }
    }

    /// Consolidated repair message listing every failed requirement
    pub fn feedback(&self, language: Language) -> String {
        let mut text = language
            .pick(
                "The previous answer does not satisfy these requirements:",
                "La risposta precedente non rispetta questi requisiti:",
            )
            .to_string();
        for violation in &self.violations {
            text.push_str(&format!(
                "\n- {} ({}: {})",
                violation.description,
                language.pick("found", "trovato"),
                violation.observed
            ));
        }
        text.push('\n');
        text.push_str(language.pick(
            "Fix the answer so that all requirements hold.",
            "Correggi la risposta in modo che tutti i requisiti siano rispettati.",
        ));
        text
    }

    /// One line per violation, as carried by a generation error
    pub fn failures(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ValidationReport {
        let mut report = ValidationReport::new();
        report.record(Ok(()));
        report.record(Err(ConstraintViolation::new(
            "tables",
            "The query must reference at least 2 distinct tables",
            "1 tables (a)",
        )));
        report.push(ConstraintViolation::new(
            "distinct",
            "The main query must use DISTINCT",
            "no DISTINCT",
        ));
        report
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert_eq!(report.summary(), "All constraints satisfied.");
    }

    #[test]
    fn test_summary_lists_constraints() {
        let report = report();
        assert!(!report.is_valid());
        assert_eq!(report.len(), 2);
        assert_eq!(report.summary(), "2 violation(s): tables, distinct");
    }

    #[test]
    fn test_feedback_echoes_descriptions_and_observed() {
        let feedback = report().feedback(Language::En);
        assert!(feedback.contains("- The query must reference at least 2 distinct tables (found: 1 tables (a))"));
        assert!(feedback.contains("- The main query must use DISTINCT (found: no DISTINCT)"));
        assert!(report().feedback(Language::It).starts_with("La risposta precedente"));
    }

    #[test]
    fn test_failures() {
        assert_eq!(
            report().failures()[1],
            "The main query must use DISTINCT (observed: no DISTINCT)"
        );
    }
}
