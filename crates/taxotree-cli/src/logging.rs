//! Structured logging to stderr.
//!
//! stdout carries command output (JSON), so log lines never go there. The
//! filter comes from `--log-level`, then `TAXOTREE_LOG`, then `info`.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub(crate) const ENV_LOG: &str = "TAXOTREE_LOG";
const DEFAULT_LEVEL: &str = "info";

pub(crate) fn init(cli_level: Option<&str>) -> Result<()> {
    let filter = resolve_filter(cli_level)?;
    Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("failed to install log subscriber")
}

fn resolve_filter(cli_level: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level.filter(|level| !level.trim().is_empty()) {
        return EnvFilter::try_new(level).with_context(|| format!("invalid --log-level '{level}'"));
    }
    match std::env::var(ENV_LOG) {
        Ok(raw) if !raw.trim().is_empty() => {
            EnvFilter::try_new(&raw).with_context(|| format!("invalid {ENV_LOG} value '{raw}'"))
        }
        _ => Ok(EnvFilter::new(DEFAULT_LEVEL)),
    }
}
