//! # Regscope CLI (`reg`)
//!
//! The `reg` binary is the analyst's interface to the regulatory corpus
//! service. It provides commands for staged document submission,
//! paginated corpus reads, and visualization snapshot export.
//!
//! ## Usage
//!
//! ```bash
//! reg --config ./config/reg.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `reg submit` | Preview a URL or pasted text, edit the draft, commit it |
//! | `reg list` | List committed documents, one page at a time |
//! | `reg show <id>` | Print a full document with metadata and body |
//! | `reg viz` | Build a visualization snapshot (local or server-computed) |
//! | `reg notify <id>` | Fire the notification side-channel for a document |
//!
//! ## Examples
//!
//! ```bash
//! # Preview a page without committing
//! reg submit --url https://gazette.example/notice-17 --preview-only
//!
//! # Submit pasted text, replacing the summarized draft before commit
//! reg submit --text-file ./notice.txt --edit-from ./notice-edited.txt
//!
//! # Export the view-models for the dashboard renderers
//! reg viz --out ./dashboard/snapshot.json
//!
//! # Use the server-side aggregation instead of aggregating locally
//! reg viz --server
//! ```

#[allow(dead_code)]
mod aggregate;
#[allow(dead_code)]
mod backend;
mod config;
mod list;
#[allow(dead_code)]
mod models;
mod notify;
mod show;
#[allow(dead_code)]
mod staging;
mod submit;
mod viz;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Regscope CLI — an analyst console for a regulatory document corpus.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/reg.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "reg",
    about = "Regscope — an analyst console for a regulatory document corpus",
    version,
    long_about = "Regscope drives a staged submission workflow (preview a URL or pasted text, \
    edit the summarized draft, commit it to the corpus) and builds the visualization \
    view-models consumed by the dashboard: source distributions, a tags-by-source matrix, \
    a severity/probability scatter, word frequencies, and a document/tag network."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/reg.toml`. Backend and paging settings are
    /// read from this file.
    #[arg(long, global = true, default_value = "./config/reg.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Submit a document through the staging workflow.
    ///
    /// Requests a summarized/tagged preview for the given URL or text,
    /// prints the draft, optionally replaces the draft text from a file,
    /// and commits it to the corpus. Exactly one of --url, --text, or
    /// --text-file must be given.
    Submit {
        /// Source URL to fetch and summarize.
        #[arg(long)]
        url: Option<String>,

        /// Raw text to summarize.
        #[arg(long)]
        text: Option<String>,

        /// Read the raw text from a file instead of the command line.
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Replace the draft's summarized text with this file's contents
        /// before committing.
        #[arg(long)]
        edit_from: Option<PathBuf>,

        /// Stop after printing the draft; commit nothing.
        #[arg(long)]
        preview_only: bool,

        /// Fire the notification side-channel after a successful commit.
        #[arg(long)]
        notify: bool,
    },

    /// List committed documents.
    ///
    /// Prints one page of the corpus with id, source, scores, and tags.
    List {
        /// Page number (1-based).
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Documents per page. Defaults to `paging.page_size` from config.
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Print a full document by id.
    Show {
        /// Document id.
        id: String,
    },

    /// Build a visualization snapshot.
    ///
    /// By default the full corpus is fetched page by page and aggregated
    /// locally. With --server the server-computed payload is consumed
    /// instead (required for word frequencies, which are tokenized
    /// upstream).
    Viz {
        /// Use the server-computed aggregation payload.
        #[arg(long)]
        server: bool,

        /// Write the snapshot JSON to this path instead of printing a
        /// summary.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Fire the notification side-channel for a committed document.
    Notify {
        /// Document id.
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // Without a config file, fall back to local development defaults.
    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::minimal()
    };

    match cli.command {
        Commands::Submit {
            url,
            text,
            text_file,
            edit_from,
            preview_only,
            notify,
        } => {
            submit::run_submit(
                &cfg,
                submit::SubmitOptions {
                    url,
                    text,
                    text_file,
                    edit_from,
                    preview_only,
                    notify,
                },
            )
            .await?;
        }
        Commands::List { page, page_size } => {
            list::run_list(&cfg, page, page_size).await?;
        }
        Commands::Show { id } => {
            show::run_show(&cfg, &id).await?;
        }
        Commands::Viz { server, out } => {
            viz::run_viz(&cfg, server, out.as_deref()).await?;
        }
        Commands::Notify { id } => {
            notify::run_notify(&cfg, &id).await?;
        }
    }

    Ok(())
}
