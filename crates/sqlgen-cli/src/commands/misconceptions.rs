//! Misconception listing command

use anyhow::Result;
use clap::Args;
use sqlgen_constraint::{Constraint, MisconceptionProfile};
use sqlgen_core::{Difficulty, Language};

#[derive(Args)]
pub struct MisconceptionsArgs {
    /// Show the constraints of one misconception
    id: Option<String>,

    /// Difficulty to show (easy, medium, hard); all levels when omitted
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Additional misconception definitions (TOML)
    #[arg(long)]
    registry: Option<String>,

    /// Language of the constraint descriptions (en, it)
    #[arg(long, default_value = "en")]
    language: Language,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    format: String,
}

pub fn run(args: MisconceptionsArgs) -> Result<()> {
    let registry = super::load_registry(args.registry.as_deref())?;

    let Some(id) = args.id else {
        if args.format == "json" {
            println!("{}", serde_json::to_string_pretty(registry.all())?);
            return Ok(());
        }
        println!("{} misconception(s):", registry.len());
        for m in registry.all() {
            let levels: Vec<&str> = m.levels.available().iter().map(|d| d.as_str()).collect();
            println!("  {:<28} {} [{}]", m.id, m.title, levels.join(", "));
        }
        return Ok(());
    };

    let difficulties = match args.difficulty {
        Some(d) => vec![d],
        None => registry
            .get(&id)
            .map(|m| m.levels.available())
            .unwrap_or_else(|| Difficulty::ALL.to_vec()),
    };
    let profiles = difficulties
        .into_iter()
        .map(|d| registry.profile(&id, d))
        .collect::<sqlgen_core::Result<Vec<_>>>()?;

    if args.format == "json" {
        let output: Vec<serde_json::Value> = profiles
            .iter()
            .map(|p| profile_json(p, args.language))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for profile in &profiles {
            print_profile(profile, args.language);
        }
    }
    Ok(())
}

fn print_profile(profile: &MisconceptionProfile, language: Language) {
    println!("{} ({})", profile.title, profile.difficulty);
    println!("  {}", profile.description);
    if !profile.extra_details.is_empty() {
        println!("  Details: {}", profile.extra_details);
    }
    for c in &profile.schema {
        println!("  [schema] {}", c.description(language));
    }
    for c in &profile.query {
        println!("  [query]  {}", c.description(language));
    }
    println!();
}

fn profile_json(profile: &MisconceptionProfile, language: Language) -> serde_json::Value {
    serde_json::json!({
        "id": profile.misconception_id,
        "title": profile.title,
        "difficulty": profile.difficulty,
        "extra_details": profile.extra_details,
        "schema": profile.schema.iter().map(|c| c.description(language)).collect::<Vec<_>>(),
        "query": profile.query.iter().map(|c| c.description(language)).collect::<Vec<_>>(),
    })
}
