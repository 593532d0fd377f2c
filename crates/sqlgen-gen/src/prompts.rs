//! Prompt templates and structured response formats

use crate::oracle::ResponseFormat;
use sqlgen_core::{Difficulty, Language};
use sqlgen_query::Dialect;

fn dialect_name(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Generic => "standard",
        Dialect::Postgres => "PostgreSQL",
        Dialect::Mysql => "MySQL",
        Dialect::Sqlite => "SQLite",
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn section(title: &str, items: &[String]) -> String {
    let items: Vec<String> = items
        .iter()
        .filter(|i| !i.trim().is_empty())
        .cloned()
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("\n\n{}:\n{}", title, bullet_list(&items))
    }
}

/// System message shared by the structured conversations
pub fn system_prompt(language: Language, dialect: Dialect) -> String {
    format!(
        "You are an assistant that writes SQL teaching material. \
         All SQL must be valid {} SQL. \
         Write every natural-language text, table name and column name in {}. \
         Reply only in the requested format.",
        dialect_name(dialect),
        language.english_name()
    )
}

/// First user message of a dataset conversation
pub fn dataset_prompt(
    domain: &str,
    extra_details: &[String],
    requirements: &[String],
    dialect: Dialect,
) -> String {
    format!(
        "Create a small database about: {}.\n\
         Put one CREATE TABLE statement per entry in `schema_tables` and one INSERT \
         statement per entry in `insert_commands`, using {} SQL. Insert realistic data \
         so that interesting queries return non-empty results.{}{}",
        domain.trim(),
        dialect_name(dialect),
        section("Additional characteristics", extra_details),
        section("Requirements", requirements),
    )
}

/// First user message of an exercise conversation
#[allow(clippy::too_many_arguments)]
pub fn exercise_prompt(
    domain: &str,
    create_commands: &[String],
    title: &str,
    misconception: &str,
    difficulty: Difficulty,
    extra_details: &[String],
    requirements: &[String],
    language: Language,
) -> String {
    let schema = create_commands
        .iter()
        .map(|c| format!("{};", c.trim().trim_end_matches(';')))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Database about {}:\n{}\n\n\
         Write an exercise of {} difficulty titled \"{}\" for students who show this misconception: {}\n\
         Put in `request` the natural-language request given to the students, written in {}, \
         and in `solution` a single SELECT query over the database above that answers it.{}{}",
        domain.trim(),
        schema,
        difficulty,
        title.trim(),
        misconception.trim(),
        language.english_name(),
        section("Additional characteristics", extra_details),
        section("Requirements for the solution", requirements),
    )
}

/// Repair message sent after an unparseable reply
pub fn parse_error_feedback(message: &str, language: Language) -> String {
    format!(
        "{}\n{}\n{}",
        language.pick(
            "The previous answer could not be parsed:",
            "La risposta precedente non è analizzabile:"
        ),
        message,
        language.pick(
            "Reply again in the requested format, with valid SQL.",
            "Rispondi di nuovo nel formato richiesto, con SQL valido."
        )
    )
}

/// Single user message of a request refinement conversation
pub fn refinement_prompt(
    request: &str,
    solution: &str,
    aliases: &[String],
    language: Language,
) -> String {
    let aliases = if aliases.is_empty() {
        String::new()
    } else {
        format!(
            "\nThe result columns must be named {}: state these names explicitly.",
            aliases
                .iter()
                .map(|a| format!("\"{}\"", a))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };
    format!(
        "Rewrite the following exercise request so that it does not hint at how to write \
         the SQL: do not mention joins, table names or SQL keywords, and describe only the \
         information the student must retrieve. Keep the meaning unchanged.{}\n\
         Reply with the rewritten request only, in {}.\n\n\
         Request:\n{}\n\n\
         Reference solution (do not reveal it):\n{}",
        aliases,
        language.english_name(),
        request.trim(),
        solution.trim(),
    )
}

fn string_array() -> serde_json::Value {
    serde_json::json!({"type": "array", "items": {"type": "string"}})
}

/// Structured shape of a dataset reply
pub fn dataset_format() -> ResponseFormat {
    ResponseFormat::Json {
        name: "dataset".to_string(),
        schema: serde_json::json!({
            "type": "object",
            "properties": {
                "schema_tables": string_array(),
                "insert_commands": string_array()
            },
            "required": ["schema_tables", "insert_commands"],
            "additionalProperties": false
        }),
    }
}

/// Structured shape of an exercise reply
pub fn exercise_format() -> ResponseFormat {
    ResponseFormat::Json {
        name: "exercise".to_string(),
        schema: serde_json::json!({
            "type": "object",
            "properties": {
                "request": {"type": "string"},
                "solution": {"type": "string"}
            },
            "required": ["request", "solution"],
            "additionalProperties": false
        }),
    }
}

/// Strip a Markdown code fence wrapped around a reply
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json, ```sql)
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
