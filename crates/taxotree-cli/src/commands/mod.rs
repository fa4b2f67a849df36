use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use taxotree_core::Taxotree;
use taxotree_core::config::{AppConfig, CacheConfig};
use taxotree_core::ingest::ImportFormat;

use crate::cli::{Cli, Commands, ImportArgs, ImportFormatArg};

mod web;


pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli);
    debug!(
        db = %config.store.db_path.display(),
        readers = config.store.reader_pool,
        cache_ttl_secs = config.cache.ttl.as_secs(),
        "resolved configuration"
    );
    let app = Taxotree::open(&config.store)
        .with_context(|| format!("failed to open store at {}", config.store.db_path.display()))?;
    run_with_app(&app, config.cache, cli.command)
}

/// Environment first, then whatever flags were given.
fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(db) = &cli.db {
        config.store.db_path.clone_from(db);
    }
    if let Some(readers) = cli.readers {
        config.store.reader_pool = usize::from(readers);
    }
    if let Commands::Web(args) = &cli.command
        && let Some(secs) = args.cache_ttl_secs
    {
        config.cache.ttl = Duration::from_secs(secs);
    }
    config
}

fn run_with_app(app: &Taxotree, cache: CacheConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Import(args) => {
            let report = import(app, &args)?;
            print_json(&report)?;
        }
        Commands::Tree => {
            print_json(&app.tree()?)?;
        }
        Commands::Children(args) => {
            let listing = app.node_children(args.path.as_deref(), args.search.as_deref())?;
            print_json(&listing)?;
        }
        Commands::Search(args) => match app.search(&args.term)? {
            Some(rollup) => print_json(&rollup)?,
            None => anyhow::bail!(
                "search term '{}' is shorter than {} characters",
                args.term,
                taxotree_core::MIN_SEARCH_TERM_CHARS
            ),
        },
        Commands::Web(args) => {
            web::serve(app, &args.host, args.port, cache)?;
        }
    }
    Ok(())
}

fn import(app: &Taxotree, args: &ImportArgs) -> Result<taxotree_core::models::ImportReport> {
    let format = resolve_format(args);
    let report = if args.replace {
        app.replace_from_file(&args.file, format)
    } else {
        app.import_file(&args.file, format)
    };
    report.with_context(|| format!("failed to import {}", args.file.display()))
}

fn resolve_format(args: &ImportArgs) -> ImportFormat {
    match args.format {
        Some(ImportFormatArg::Tree) => ImportFormat::Tree,
        Some(ImportFormatArg::Jsonl) => ImportFormat::Jsonl,
        None => ImportFormat::from_path(&args.file),
    }
}

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
