//! Assignment generation command

use anyhow::{Context, Result};
use clap::Args;
use sqlgen_core::{Difficulty, Language};
use sqlgen_gen::providers::{create_oracle, mock::MockOracle};
use sqlgen_gen::{
    AssignmentGenerator, GenerationOracle, GenerationSettings, OracleStatus, SqlGenConfig,
};
use sqlgen_query::Dialect;
use std::path::Path;

#[derive(Args)]
pub struct GenerateArgs {
    /// Domain of the dataset (e.g. "a public library")
    #[arg(long, short)]
    domain: String,

    /// Misconception pick as `id` or `id:difficulty` (repeatable)
    #[arg(long = "pick", value_parser = super::parse_pick, required = true)]
    picks: Vec<(String, Difficulty)>,

    /// Extra characteristic of the dataset (repeatable)
    #[arg(long = "detail")]
    details: Vec<String>,

    /// Provider to use (openai, mock)
    #[arg(long)]
    provider: Option<String>,

    /// JSON array of scripted replies for the mock provider
    #[arg(long)]
    mock_replies: Option<String>,

    /// Additional misconception definitions (TOML)
    #[arg(long)]
    registry: Option<String>,

    /// Oracle calls allowed per artifact
    #[arg(long)]
    max_attempts: Option<usize>,

    /// SQL dialect (generic, postgres, mysql, sqlite)
    #[arg(long)]
    dialect: Option<Dialect>,

    /// Language of the exercises (en, it)
    #[arg(long)]
    language: Option<Language>,

    /// Keep the requests exactly as first accepted
    #[arg(long)]
    no_refine: bool,

    /// Output directory for `dataset.sql` and `assignment.json`
    #[arg(long, short)]
    output: Option<String>,

    /// Schema name used in `dataset.sql`
    #[arg(long, default_value = "exercise")]
    schema_name: String,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let config = SqlGenConfig::load()?;

    let mut settings = GenerationSettings::from_config(&config.generation);
    if let Some(max_attempts) = args.max_attempts {
        anyhow::ensure!(max_attempts > 0, "--max-attempts must be at least 1");
        settings.max_attempts = max_attempts;
    }
    if let Some(dialect) = args.dialect {
        settings.dialect = dialect;
    }
    if let Some(language) = args.language {
        settings.language = language;
    }
    if args.no_refine {
        settings.refine_requests = false;
    }

    let oracle: Box<dyn GenerationOracle> = match &args.mock_replies {
        Some(path) => Box::new(
            MockOracle::from_file(path).with_context(|| format!("loading replies from {}", path))?,
        ),
        None => {
            let name = args
                .provider
                .as_deref()
                .unwrap_or(config.generation.provider.as_str());
            create_oracle(name, &config)?
        }
    };

    match oracle.health_check()? {
        OracleStatus::Available => {}
        OracleStatus::NoApiKey => {
            anyhow::bail!("Provider '{}' has no API key configured", oracle.name())
        }
        OracleStatus::Unavailable(reason) => {
            anyhow::bail!("Provider '{}' is unavailable: {}", oracle.name(), reason)
        }
    }

    let registry = super::load_registry(args.registry.as_deref())?;

    eprintln!(
        "Generating {} exercise(s) about '{}' with {}...",
        args.picks.len(),
        args.domain,
        oracle.name()
    );

    let assignment = AssignmentGenerator::new(oracle.as_ref(), &registry, settings)
        .with_dataset_details(args.details)
        .generate(&args.domain, &args.picks)?;

    let record = assignment.to_record();
    let json = serde_json::to_string_pretty(&record)?;

    match &args.output {
        Some(dir) => {
            let dir = Path::new(dir);
            std::fs::create_dir_all(dir)?;
            let sql_path = dir.join("dataset.sql");
            let json_path = dir.join("assignment.json");
            std::fs::write(&sql_path, assignment.dataset.to_sql(&args.schema_name))?;
            std::fs::write(&json_path, json)?;
            println!("Dataset written to {}", sql_path.display());
            println!("Assignment written to {}", json_path.display());
        }
        None => println!("{}", json),
    }

    for exercise in &assignment.exercises {
        eprintln!(
            "  [{}] {} ({})",
            exercise.misconception_id, exercise.title, exercise.difficulty
        );
    }

    Ok(())
}
