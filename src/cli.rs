//! CLI struct definitions for the modelbook command-line interface.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "modelbook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate per-model markdown records and build the public model catalog API."
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./modelbook.toml when present).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Data directory holding one subdirectory per model.
    #[clap(long, global = true)]
    pub data: Option<PathBuf>,
    /// Output directory for the API artifacts.
    #[clap(long, global = true)]
    pub api: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Scan every model and rewrite the API artifacts.
    Build,
    /// Scan and validate every model without writing anything.
    Check(FormatCli),
    /// Add a model from an issue-form body.
    Add(AddCli),
    /// Print the canonical id for a creator and model name.
    Id {
        /// Creator name, e.g. "Google DeepMind".
        creator: String,
        /// Model name, e.g. "Gemini 2.5 Flash Image".
        name: String,
    },
    /// Avatar bookkeeping for the generation pipeline.
    Avatars(AvatarsCli),
    /// Print record schemas and artifact shapes as JSON.
    Schema,
}

#[derive(clap::Args, Debug)]
pub(crate) struct FormatCli {
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug)]
pub(crate) struct AddCli {
    /// Read the body from this file instead of $ISSUE_BODY.
    #[clap(long)]
    pub input: Option<PathBuf>,
    /// Append step outputs here instead of $GITHUB_OUTPUT.
    #[clap(long)]
    pub outputs: Option<PathBuf>,
    /// Report failures as GitHub Actions `::error::` annotations.
    #[clap(long)]
    pub github: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct AvatarsCli {
    #[clap(subcommand)]
    pub command: AvatarsCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum AvatarsCommand {
    /// List models that still need an avatar.
    Pending(FormatCli),
    /// List stored avatar keys that belong to no model.
    Orphans {
        /// Key inventory, one object key per line (defaults to stdin).
        #[clap(long)]
        keys: Option<PathBuf>,
    },
}
