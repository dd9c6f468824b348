//! modelbook: the data pipeline behind a public catalog of AI models.
//!
//! Every model lives in its own directory of markdown records:
//!
//! ```text
//! data/<model-id>/
//!   core.md                       required, validated core metadata
//!   description.md                long-form description
//!   tweets.md                     curated tweet excerpts
//!   avatar.md                     avatar cache of the generation pipeline
//!   providers api endpoints/*.md  endpoint ids per provider
//! ```
//!
//! `modelbook build` validates all of it and writes the public API:
//! `models.json`, `tweets.json` and one `descriptions/<id>.json` per model.
//! A single invalid record fails the whole build and nothing is written.
//!
//! # Crate Structure
//!
//! - [`core`]: schemas, the markdown codec, typed records, paths, config
//! - [`plugins`]: the API build, model intake and avatar bookkeeping

pub mod core;
pub mod plugins;

mod cli;

use crate::cli::{AddCli, AvatarsCommand, Cli, Command};
use crate::core::config::{self, CatalogConfig};
use crate::core::error::CatalogError;
use crate::core::output;
use crate::core::paths::{ApiLayout, DataLayout};
use crate::core::records::{self, ModelCore};
use crate::core::schema::Record;
use crate::plugins::{api, avatars, intake};

use clap::Parser;
use colored::Colorize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

fn init_tracing(filter: &str) {
    let env_filter = match tracing_subscriber::EnvFilter::try_new(filter) {
        Ok(f) => f,
        Err(e) => {
            eprintln!(
                "WARN: log filter '{}' is not valid ({}); falling back to 'warn'",
                filter, e
            );
            tracing_subscriber::EnvFilter::new("warn")
        }
    };

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<(), CatalogError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    let mut config = CatalogConfig::load(&current_dir, cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_dir = current_dir.join(data);
    }
    if let Some(api_dir) = cli.api {
        config.api_dir = current_dir.join(api_dir);
    }
    init_tracing(&config.log);

    let data = DataLayout::new(&config.data_dir);
    let api_layout = ApiLayout::new(&config.api_dir);

    match cli.command {
        Command::Build => {
            let summary = api::build_api(&data, &api_layout)?;
            print_build_summary(&summary);
        }
        Command::Check(format) => {
            let catalog = api::scan_catalog(&data)?;
            print_check(&catalog, &format.format)?;
        }
        Command::Add(add_cli) => run_add(&data, add_cli)?,
        Command::Id { creator, name } => {
            println!("{}", records::model_id(&creator, &name));
        }
        Command::Avatars(avatars_cli) => match avatars_cli.command {
            AvatarsCommand::Pending(format) => {
                let catalog = api::scan_catalog(&data)?;
                print_pending(&avatars::pending_avatars(&catalog), &format.format)?;
            }
            AvatarsCommand::Orphans { keys } => run_orphans(&data, keys.as_deref())?,
        },
        Command::Schema => {
            let document = serde_json::json!({
                "records": [
                    ModelCore::SCHEMA.to_json(),
                    records::PROVIDER_ENDPOINTS_SCHEMA.to_json(),
                    records::TWEETS_SCHEMA.to_json(),
                    records::AVATAR_SCHEMA.to_json(),
                ],
                "api": api::schema(),
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}

fn print_build_summary(summary: &api::BuildSummary) {
    println!(
        "{} api built: {} models -> {}",
        "👑".bright_yellow(),
        summary.models.to_string().bright_white().bold(),
        summary.models_path.display()
    );
    println!(
        "{} tweets built: {} models -> {}",
        "🐦".bright_cyan(),
        summary.tweets.to_string().bright_white().bold(),
        summary.tweets_path.display()
    );
    println!(
        "{} descriptions built: {} models -> {}/",
        "📝".bright_green(),
        summary.descriptions.to_string().bright_white().bold(),
        summary.descriptions_dir.display()
    );
}

fn print_check(catalog: &api::Catalog, format: &str) -> Result<(), CatalogError> {
    let upcoming: Vec<&str> = catalog
        .models
        .iter()
        .filter(|m| m.core.release_date.is_none())
        .map(|m| m.core.id.as_str())
        .collect();

    if format == "json" {
        let report = serde_json::json!({
            "status": "ok",
            "models": catalog.models.len(),
            "upcoming": upcoming,
            "tweets": catalog.tweets.len(),
            "descriptions": catalog.descriptions.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} models valid ({} with tweets, {} with descriptions)",
        "✓".bright_green(),
        catalog.models.len().to_string().bright_white().bold(),
        catalog.tweets.len(),
        catalog.descriptions.len()
    );
    if !upcoming.is_empty() {
        println!(
            "  {} {}",
            "upcoming:".bright_black(),
            output::preview_list(&upcoming, 5)
        );
    }
    Ok(())
}

fn print_pending(plan: &avatars::AvatarPlan, format: &str) -> Result<(), CatalogError> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    for job in &plan.pending {
        println!(
            "  {} {} {} ({}, {})",
            "●".bright_cyan(),
            job.id.bright_white(),
            output::compact_line(&job.name, 40),
            job.size,
            job.modality.as_str()
        );
    }
    for skipped in &plan.skipped {
        let modalities = skipped
            .modalities
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {} {} {}",
            "↷".bright_black(),
            skipped.id.bright_black(),
            format!("(unsupported modality: {})", modalities).bright_black()
        );
    }
    println!(
        "{} pending, {} skipped",
        plan.pending.len().to_string().bright_white().bold(),
        plan.skipped.len()
    );
    Ok(())
}

fn run_add(data: &DataLayout, add_cli: AddCli) -> Result<(), CatalogError> {
    let github = add_cli.github;
    let result = add_from_sources(data, add_cli);
    if github && let Err(e) = &result {
        eprintln!("::error::{}", e);
    }
    result
}

fn add_from_sources(data: &DataLayout, add_cli: AddCli) -> Result<(), CatalogError> {
    let (body, source) = match add_cli.input {
        Some(path) => {
            let body = std::fs::read_to_string(&path).map_err(CatalogError::io_at(&path))?;
            (body, path)
        }
        None => (
            config::require_env(intake::ISSUE_BODY_ENV)?,
            PathBuf::from(format!("${}", intake::ISSUE_BODY_ENV)),
        ),
    };
    let outputs_path = match add_cli.outputs {
        Some(path) => path,
        None => PathBuf::from(config::require_env(intake::GITHUB_OUTPUT_ENV)?),
    };

    let added = intake::add_model(data, &body, &source)?;
    intake::append_outputs(&outputs_path, &intake::workflow_outputs(&added.model))?;
    println!(
        "{} successfully created {}",
        "✓".bright_green(),
        added.core_path.display()
    );
    Ok(())
}

fn run_orphans(data: &DataLayout, keys: Option<&Path>) -> Result<(), CatalogError> {
    let text = match keys {
        Some(path) => std::fs::read_to_string(path).map_err(CatalogError::io_at(path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut inventory = avatars::KeyInventory::parse(&text, avatars::LIST_PAGE_SIZE);
    let listed = avatars::collect_keys(&mut inventory, avatars::AVATAR_PREFIX)?;
    let model_ids: BTreeSet<String> = api::list_model_ids(data)?.into_iter().collect();
    println!("Found {} models", model_ids.len());

    let orphans = avatars::find_orphaned_avatars(&model_ids, listed);
    if orphans.is_empty() {
        println!("No orphaned avatars found.");
        return Ok(());
    }

    println!("Found {} orphaned avatar(s):", orphans.len());
    for key in &orphans {
        println!("  {}", key);
    }
    Ok(())
}
