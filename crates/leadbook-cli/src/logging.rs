// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LEADBOOK_LOG";

/// Sends tracing output to `file`. The terminal belongs to the TUI, so with no
/// file configured nothing is installed and events are dropped.
pub fn init_logging(file: Option<&Path>, level: &str) -> Result<()> {
    let Some(path) = file else {
        return Ok(());
    };

    let filter = build_filter(std::env::var(LOG_ENV).ok().as_deref(), level)?;
    let writer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- fix [log].file or remove it to disable logging",
                path.display()
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(writer))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn build_filter(env_override: Option<&str>, level: &str) -> Result<EnvFilter> {
    let directives = env_override
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(level);
    EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter {directives:?}; try info or leadbook_app=debug"))
}

#[cfg(test)]
mod tests {
    use super::build_filter;
    use anyhow::Result;

    #[test]
    fn env_override_wins_over_config_level() -> Result<()> {
        let filter = build_filter(Some("debug"), "info")?;
        assert!(filter.to_string().contains("debug"));

        let filter = build_filter(Some("  "), "warn")?;
        assert!(filter.to_string().contains("warn"));
        Ok(())
    }

    #[test]
    fn bad_directive_is_reported() {
        let error = build_filter(None, "leadbook=loud").expect_err("invalid filter");
        assert!(error.to_string().contains("invalid log filter"));
    }
}
