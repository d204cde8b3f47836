//! # LAQ Audit CLI (`laq`)
//!
//! The `laq` binary is the operator interface for LAQ Audit. It loads a
//! JSON corpus snapshot into an in-memory vector store and runs
//! retrieval and annexure cross-reference audits against it.
//!
//! ## Usage
//!
//! ```bash
//! laq --config ./config/laq.toml --corpus snapshot.json <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `laq search "<query>"` | Semantic search over LAQ records |
//! | `laq validate <case>` | Cross-reference audit for one LAQ |
//! | `laq validate-all` | Cross-reference audit for every LAQ in the store |
//! | `laq stats` | Annexure usage statistics across the corpus |
//! | `laq duplicates` | List duplicate annexure attachments |
//! | `laq duplicates --remove` | Delete redundant duplicate attachments |
//!
//! ## Examples
//!
//! ```bash
//! # Audit one question's annexure references
//! laq --corpus snapshot.json validate LAQ-2024-0117
//!
//! # Audit the whole corpus and print the summary as JSON
//! laq --corpus snapshot.json validate-all
//!
//! # Semantic search (requires an embedding provider in the config)
//! laq --corpus snapshot.json search "water infrastructure funding"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use laq_audit::config;
use laq_audit::context::build_context;
use laq_audit::corpus::load_corpus;
use laq_audit::embedding::{create_provider, EmbeddingProvider};
use laq_audit::retrieval::Retriever;
use laq_audit::scoring::tier_histogram;
use laq_audit::store::memory::InMemoryStore;
use laq_audit::validate::Validator;

/// LAQ Audit CLI — retrieval and annexure cross-reference auditing for
/// Legislative Assembly Question records.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file and a `--corpus` flag pointing to a JSON store snapshot. See
/// `config/laq.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "laq",
    about = "LAQ Audit — retrieval and annexure cross-reference auditing for Legislative Assembly Questions",
    version,
    long_about = "LAQ Audit retrieves semantically similar Legislative Assembly Questions and \
    audits annexure cross-references: every reference in an answer must resolve to a stored \
    attachment, and every stored attachment should be referenced by some answer."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/laq.toml`. Store, embedding, and retrieval
    /// settings are read from this file.
    #[arg(long, global = true, default_value = "./config/laq.toml")]
    config: PathBuf,

    /// Path to a JSON corpus snapshot to load into the in-memory store.
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Search LAQ records by semantic similarity.
    ///
    /// Embeds the query, ranks stored records by similarity percentage,
    /// and prints each match with its quality tier. Requires an
    /// embedding provider in the configuration.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return. Defaults to
        /// `retrieval.search_top_k` from the configuration.
        #[arg(long)]
        top_k: Option<usize>,

        /// Return all neighbors regardless of the similarity threshold.
        #[arg(long)]
        no_threshold: bool,

        /// Print an assembled context block instead of a result list.
        #[arg(long)]
        context: bool,
    },

    /// Audit annexure cross-references for a single LAQ.
    ///
    /// Compares the annexure labels referenced by the question's answer
    /// against the attachment records stored for it, and prints the
    /// report as JSON.
    Validate {
        /// LAQ number (case identifier).
        case: String,
    },

    /// Audit annexure cross-references for every LAQ in the store.
    ///
    /// Groups records by LAQ number and source document, audits each
    /// group, and prints a summary with per-case reports as JSON.
    ValidateAll,

    /// Print annexure usage statistics across the corpus.
    ///
    /// Counts stored attachments and answer-side references, including
    /// per-label reference counts, unreferenced attachments, and
    /// references with no matching attachment.
    Stats,

    /// List duplicate annexure attachments.
    ///
    /// Attachments sharing a LAQ number and normalized label are
    /// duplicates; the earliest stored copy in each group is kept.
    Duplicates {
        /// Delete the redundant copies instead of just listing them.
        #[arg(long)]
        remove: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    let store = Arc::new(InMemoryStore::new(cfg.store.dims));
    match &cli.corpus {
        Some(path) => {
            let loaded = load_corpus(path, &store)?;
            tracing::info!(loaded, corpus = %path.display(), "corpus snapshot loaded");
        }
        None => anyhow::bail!("no corpus loaded; pass --corpus <snapshot.json>"),
    }

    match cli.command {
        Commands::Search {
            query,
            top_k,
            no_threshold,
            context,
        } => {
            let provider: Arc<dyn EmbeddingProvider> =
                Arc::from(create_provider(&cfg.embedding)?);
            let retriever = Retriever::new(store, provider, cfg.retrieval.clone());

            if context {
                let results = retriever.context_results(&query).await?;
                println!("{}", build_context(&results));
                return Ok(());
            }

            let results = retriever.search(&query, top_k, !no_threshold).await?;
            if results.is_empty() {
                println!("No matches.");
                return Ok(());
            }
            for r in &results {
                let laq = r
                    .metadata
                    .get(laq_audit::models::meta::LAQ_NUM)
                    .map(String::as_str)
                    .unwrap_or("?");
                println!(
                    "{:>3}. [{:5.1}%] {} LAQ #{} ({})",
                    r.rank, r.similarity, r.tier, laq, r.id
                );
            }
            let tiers = tier_histogram(&results);
            println!(
                "\n{} result(s): {} strong, {} moderate, {} weak",
                results.len(),
                tiers.strong,
                tiers.moderate,
                tiers.weak
            );
        }
        Commands::Validate { case } => {
            let report = Validator::new(store).validate_case(&case).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::ValidateAll => {
            let summary = Validator::new(store).validate_all().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Stats => {
            let stats = Validator::new(store).usage_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Duplicates { remove } => {
            let validator = Validator::new(store);
            let groups = validator.find_duplicates().await?;
            if groups.is_empty() {
                println!("No duplicate annexures found.");
                return Ok(());
            }
            for g in &groups {
                println!(
                    "LAQ #{} annexure {}: keeping {}, {} redundant",
                    g.case_id,
                    g.label,
                    g.kept,
                    g.redundant.len()
                );
            }
            if remove {
                let outcome = validator.remove_duplicates().await?;
                println!(
                    "Removed {} redundant attachment(s) across {} group(s).",
                    outcome.removed.len(),
                    outcome.groups_affected
                );
            }
        }
    }

    Ok(())
}
