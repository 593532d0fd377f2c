//! Offline validation command
//!
//! Runs the constraint library over hand-written SQL without contacting an
//! oracle. Exits with status 1 when any constraint is violated.

use anyhow::{Context, Result};
use clap::Args;
use sqlgen_constraint::{ConstraintSet, Level, ValidationReport};
use sqlgen_core::{Difficulty, Language};
use sqlgen_query::{build_catalog, insert_row_counts, parse, Dialect};
use std::collections::BTreeMap;

#[derive(Args)]
pub struct CheckArgs {
    /// SQL file with the CREATE TABLE statements
    #[arg(long)]
    schema: String,

    /// SQL file with the INSERT statements
    #[arg(long)]
    data: Option<String>,

    /// SQL file with the solution query
    #[arg(long)]
    query: Option<String>,

    /// Misconception pick as `id` or `id:difficulty` (repeatable)
    #[arg(long = "pick", value_parser = super::parse_pick)]
    picks: Vec<(String, Difficulty)>,

    /// TOML file with `schema = [...]` and `query = [...]` constraint lists
    #[arg(long)]
    constraints: Option<String>,

    /// Additional misconception definitions (TOML)
    #[arg(long)]
    registry: Option<String>,

    /// SQL dialect (generic, postgres, mysql, sqlite)
    #[arg(long, default_value = "postgres")]
    dialect: Dialect,

    /// Language of the violation messages (en, it)
    #[arg(long, default_value = "en")]
    language: Language,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    format: String,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let set = constraint_set(&args)?;
    if set.is_empty() {
        println!("No constraints selected. Use --pick or --constraints.");
        return Ok(());
    }

    let schema_sql = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("reading {}", args.schema))?;
    let catalog = build_catalog(&[schema_sql], args.dialect)?;

    let rows = match &args.data {
        Some(path) => {
            let data = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            insert_row_counts(&[data], args.dialect)?
        }
        None => BTreeMap::new(),
    };

    let schema_report = set.validate_schema(&catalog, &rows, args.language);

    let query_report = match &args.query {
        Some(path) => {
            let sql = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            let query = parse(&sql, args.dialect)?;
            Some(set.validate_query(&query, &catalog, args.language))
        }
        None => {
            if !set.query.is_empty() {
                eprintln!("Warning: no --query given, skipping {} query constraint(s)", set.query.len());
            }
            None
        }
    };

    let valid = schema_report.is_valid() && query_report.as_ref().map_or(true, |r| r.is_valid());

    if args.format == "json" {
        let output = serde_json::json!({
            "valid": valid,
            "schema": report_json(&schema_report),
            "query": query_report.as_ref().map(report_json),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report("Schema", &schema_report);
        if let Some(report) = &query_report {
            print_report("Query", report);
        }
    }

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

fn constraint_set(args: &CheckArgs) -> Result<ConstraintSet> {
    let registry = super::load_registry(args.registry.as_deref())?;
    let profiles = args
        .picks
        .iter()
        .map(|(id, difficulty)| registry.profile(id, *difficulty))
        .collect::<sqlgen_core::Result<Vec<_>>>()?;
    let mut set = ConstraintSet::from_profiles(&profiles)?;

    if let Some(path) = &args.constraints {
        let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
        let level: Level =
            toml::from_str(&content).with_context(|| format!("parsing constraints in {}", path))?;
        let mut schema = set.schema;
        schema.extend(level.schema);
        set = ConstraintSet::new(
            sqlgen_constraint::merge_schema_constraints(&schema)?,
            set.query.into_iter().chain(level.query).collect(),
        );
    }
    Ok(set)
}

fn print_report(label: &str, report: &ValidationReport) {
    if report.is_valid() {
        println!("{}: all constraints satisfied.", label);
        return;
    }
    println!("{}: {}", label, report.summary());
    for violation in &report.violations {
        println!("  [{}] {}", violation.constraint, violation);
    }
}

fn report_json(report: &ValidationReport) -> serde_json::Value {
    let violations: Vec<serde_json::Value> = report
        .violations
        .iter()
        .map(|v| {
            serde_json::json!({
                "constraint": v.constraint,
                "description": v.description,
                "observed": v.observed,
            })
        })
        .collect();
    serde_json::json!({
        "valid": report.is_valid(),
        "summary": report.summary(),
        "violations": violations,
    })
}
