//! Command-line interface definitions.

pub mod commands;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Assessment recommendation engine.
#[derive(Parser, Debug)]
#[command(
    name = "assessrec",
    version,
    about = "Semantic assessment recommendations with LLM reranking and offline evaluation"
)]
pub struct Cli {
    /// Path to the catalog database (default: ~/.assessrec/data/catalog.db).
    #[arg(long, global = true, env = "ASSESSREC_DB")]
    pub db: Option<PathBuf>,

    /// Data directory for ground truth and evaluation runs.
    #[arg(long, global = true, env = "ASSESSREC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Force JSON output (also the default when stdout is not a TTY).
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output entirely.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the catalog database.
    Init {
        /// Recreate the database even if it already exists.
        #[arg(long)]
        force: bool,
    },

    /// Load assessments from a catalog CSV.
    Load {
        /// Path to the CSV file.
        csv: PathBuf,
    },

    /// Generate missing catalog embeddings (all of them with --force).
    Embed {
        /// Re-embed every assessment, not just rows without a vector.
        #[arg(long)]
        force: bool,

        /// Rows per batch when talking to the provider.
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Recommend assessments for a natural-language query.
    Recommend(RecommendArgs),

    /// Inspect the catalog.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Ground-truth management and offline evaluation.
    Evaluate {
        #[command(subcommand)]
        command: EvaluateCommands,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(clap::Args, Debug)]
pub struct RecommendArgs {
    /// The job description or requirements query.
    pub query: String,

    /// Number of recommendations to return (1-20).
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Filter: job levels (repeatable).
    #[arg(long = "job-level")]
    pub job_levels: Vec<String>,

    /// Filter: test types (repeatable).
    #[arg(long = "test-type")]
    pub test_types: Vec<String>,

    /// Filter: languages (repeatable).
    #[arg(long = "language")]
    pub languages: Vec<String>,

    /// Filter: maximum duration in minutes.
    #[arg(long)]
    pub max_duration: Option<u32>,

    /// Filter: remote testing availability.
    #[arg(long)]
    pub remote: Option<bool>,

    /// Filter: similarity floor (explicit 0 disables the floor).
    #[arg(long)]
    pub min_similarity: Option<f32>,

    /// Emit the simple wire shape (at most 10 items, never fails).
    #[arg(long)]
    pub simple: bool,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List assessments with optional attribute filters.
    List {
        #[arg(long)]
        job_level: Option<String>,
        #[arg(long)]
        test_type: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        remote: Option<bool>,
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    /// Show one assessment by id.
    Show { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum EvaluateCommands {
    /// Import a ground-truth JSON file (array of entries).
    Import {
        /// Path to the ground-truth JSON file.
        file: PathBuf,
    },

    /// Show the current ground-truth set.
    Show,

    /// Run the full evaluation and persist one run artifact.
    Run {
        /// Cutoff K for Recall@K and MAP@K.
        #[arg(long, default_value_t = 10)]
        k: usize,
    },

    /// Evaluate a single ground-truth query.
    Query {
        /// Ground-truth entry id.
        query_id: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
    },

    /// List past evaluation runs, newest first.
    History,
}
