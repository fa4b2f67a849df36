use std::path::PathBuf;

use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportFormatArg {
    Tree,
    Jsonl,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub file: PathBuf,
    /// Input layout. Inferred from the file extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<ImportFormatArg>,
    /// Swap every stored record for the loaded ones; nothing changes if loading fails.
    #[arg(long, default_value_t = false)]
    pub replace: bool,
}

#[derive(Debug, Args)]
pub struct ChildrenArgs {
    /// Parent path; omit for top-level records.
    #[arg(long, allow_hyphen_values = true)]
    pub path: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(allow_hyphen_values = true)]
    pub term: String,
}

#[derive(Debug, Args)]
pub struct WebArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8787)]
    pub port: u16,
    /// Listing cache lifetime; 0 disables caching [env: TAXOTREE_CACHE_TTL_SECS].
    #[arg(long)]
    pub cache_ttl_secs: Option<u64>,
}
