// src/pipeline.rs
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, instrument, warn};

use crate::browser::{Browser, WebDriverBrowser};
use crate::clean::{write_clean, ColumnRule};
use crate::config::{self, Config};
use crate::error::{PipelineError, Result};
use crate::extract::save_markup;
use crate::navigate::Navigator;
use crate::table::parse_markup_file;

/// Open a WebDriver session and run every stage on it.
pub async fn run(config: &Config) -> anyhow::Result<PathBuf> {
    config.validate().context("checking configuration")?;
    let browser = WebDriverBrowser::connect(
        &config.webdriver_url,
        config.wait_timeout,
        config.poll_interval,
    )
    .await
    .map_err(PipelineError::Session)
    .with_context(|| format!("opening browser session at {}", config.webdriver_url))?;

    let out = run_with_session(&browser, config)
        .await
        .context("scraping ranked list")?;
    Ok(out)
}

/// Run the stages on `browser`, then close the session whatever the outcome.
pub async fn run_with_session<B: Browser + ?Sized>(browser: &B, config: &Config) -> Result<PathBuf> {
    let outcome = run_stages(browser, config).await;
    if let Err(e) = browser.close().await {
        warn!(error = %e, "closing browser session failed");
    }
    outcome
}

#[instrument(level = "info", skip_all, fields(sort = %config.sort_label))]
async fn run_stages<B: Browser + ?Sized>(browser: &B, config: &Config) -> Result<PathBuf> {
    let nav = Navigator::from_config(config);
    nav.open(browser).await?;
    nav.go_to_ranked_list(browser).await?;
    nav.sort_by(browser, &config.sort_label).await?;

    let markup = save_markup(browser, &config::list_container(), config.markup_path()).await?;
    let out = process_markup(&markup, &config.output_path(), &config.column_rules)?;
    info!(path = %out.display(), "pipeline finished");
    Ok(out)
}

/// Offline half of the pipeline: snapshot file to cleaned CSV.
pub fn process_markup(markup: &Path, output: &Path, rules: &[ColumnRule]) -> Result<PathBuf> {
    let table = parse_markup_file(markup)?;
    write_clean(&table, output, rules)
}
