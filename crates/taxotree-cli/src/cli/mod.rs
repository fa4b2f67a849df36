use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod args;


pub use args::{ChildrenArgs, ImportArgs, ImportFormatArg, SearchArgs, WebArgs};

#[derive(Debug, Parser)]
#[command(name = "taxotree")]
#[command(about = "Import and browse path-encoded taxonomy hierarchies", version)]
pub struct Cli {
    /// SQLite database holding the flat records [env: TAXOTREE_DB].
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Number of pooled read connections [env: TAXOTREE_READER_POOL].
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub readers: Option<u16>,

    /// Log filter directive, e.g. `debug` or `taxotree_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load records from a nested JSON tree or a JSONL record file.
    Import(ImportArgs),
    /// Print the whole hierarchy under the first top-level record.
    Tree,
    /// Print one level of children, optionally annotated by a search term.
    Children(ChildrenArgs),
    /// Print per-top-level size sums for records matching a term.
    Search(SearchArgs),
    /// Serve the JSON API.
    Web(WebArgs),
}
