//! Generated exercises and assignments

use crate::dataset::{Dataset, DatasetRecord};
use serde::{Deserialize, Serialize};
use sqlgen_core::Difficulty;
use sqlgen_query::Query;

/// An exercise with its accepted reference solution
#[derive(Debug, Clone)]
pub struct Exercise {
    pub title: String,
    pub difficulty: Difficulty,
    pub misconception_id: String,
    pub request: String,
    pub solution: Query,
}

impl Exercise {
    /// Aliases of the solution's output columns, in order
    pub fn solution_aliases(&self) -> Vec<String> {
        self.solution
            .output_columns()
            .iter()
            .filter(|c| c.is_aliased())
            .filter_map(|c| c.alias.clone())
            .collect()
    }

    pub fn to_record(&self) -> ExerciseRecord {
        ExerciseRecord {
            title: self.title.clone(),
            difficulty: self.difficulty,
            misconception_id: self.misconception_id.clone(),
            request: self.request.clone(),
            solution: self.solution.sql().to_string(),
        }
    }
}

/// Serializable form of an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub title: String,
    pub difficulty: Difficulty,
    pub misconception_id: String,
    pub request: String,
    pub solution: String,
}

/// One dataset and the exercises generated over it
#[derive(Debug)]
pub struct Assignment {
    pub dataset: Dataset,
    pub exercises: Vec<Exercise>,
}

impl Assignment {
    pub fn to_record(&self) -> AssignmentRecord {
        AssignmentRecord {
            dataset: self.dataset.to_record(),
            exercises: self.exercises.iter().map(Exercise::to_record).collect(),
        }
    }
}

/// Serializable form of an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub dataset: DatasetRecord,
    pub exercises: Vec<ExerciseRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgen_query::{parse, Dialect};

    fn exercise(sql: &str) -> Exercise {
        Exercise {
            title: "Orders per customer".to_string(),
            difficulty: Difficulty::Medium,
            misconception_id: "missing_join".to_string(),
            request: "List customers and their orders".to_string(),
            solution: parse(sql, Dialect::Postgres).unwrap(),
        }
    }

    #[test]
    fn test_solution_aliases() {
        let ex = exercise("SELECT c.name AS customer, o.id, o.total AS total FROM customer c JOIN orders o ON o.customer_id = c.id");
        assert_eq!(ex.solution_aliases(), vec!["customer".to_string()]);
    }

    #[test]
    fn test_record_serializes_difficulty_lowercase() {
        let record = exercise("SELECT 1").to_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["difficulty"], "medium");
        assert_eq!(json["solution"], "SELECT 1");
    }
}
