// src/config.rs
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use url::Url;

use crate::browser::Selector;
use crate::clean::ColumnRule;
use crate::error::{PipelineError, Result};
use crate::retry::RetryPolicy;

/// Landing page the session is opened on.
pub const START_URL: &str = "https://www.imdb.com";

/// Default WebDriver endpoint (chromedriver / geckodriver).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Sort option picked when the caller does not name one.
pub const DEFAULT_SORT_LABEL: &str = "Release Date";

/// Visible text of the menu link leading to the ranked list.
pub const RANKED_LIST_LINK_TEXT: &str = "Top 250 TV Shows";

pub const MENU_XPATH: &str = r#"//*[@id="imdbHeader-navDrawerOpen--desktop"]/div"#;
pub const SORT_CONTROL_XPATH: &str = r#"//*[@id="lister-sort-by-options"]"#;
pub const LIST_CONTAINER_XPATH: &str = r#"//*[@class = "lister"]"#;

/// Markup snapshot, relative to the working directory.
pub const MARKUP_FILE: &str = "innerhtml.html";
pub const OUTPUT_DIR: &str = "output";
pub const OUTPUT_FILE: &str = "IMDB_TOP_250_TV_SHOWS_LIST.csv";
pub const SCREENSHOT_FILE: &str = "Last_page_before_error.png";

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Everything one pipeline run needs. `Default` reproduces the fixed run.
#[derive(Debug, Clone)]
pub struct Config {
    pub start_url: String,
    pub webdriver_url: String,
    pub sort_label: String,
    pub markup_path: PathBuf,
    pub output_dir: PathBuf,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
    pub column_rules: Vec<ColumnRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_url: START_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            sort_label: DEFAULT_SORT_LABEL.to_string(),
            markup_path: PathBuf::from(MARKUP_FILE),
            output_dir: PathBuf::from(OUTPUT_DIR),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::new(DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY),
            column_rules: ColumnRule::defaults(),
        }
    }
}

impl Config {
    /// Final CSV location.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE)
    }

    /// Where the failure screenshot lands; shares the output directory.
    pub fn screenshot_path(&self) -> PathBuf {
        self.output_dir.join(SCREENSHOT_FILE)
    }

    pub fn markup_path(&self) -> &Path {
        &self.markup_path
    }

    /// Reject URLs the session could never open before a driver is started.
    pub fn validate(&self) -> Result<()> {
        http_url("start URL", &self.start_url)?;
        http_url("WebDriver URL", &self.webdriver_url)?;
        if self.sort_label.trim().is_empty() {
            return Err(PipelineError::Config("sort label is empty".into()));
        }
        Ok(())
    }

    /// Switch every rule to skip-if-absent.
    pub fn lenient_columns(mut self) -> Self {
        self.column_rules = self
            .column_rules
            .into_iter()
            .map(ColumnRule::skip_if_missing)
            .collect();
        self
    }
}

fn http_url(what: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| PipelineError::Config(format!("{} {:?}: {}", what, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PipelineError::Config(format!(
            "{} {:?}: unsupported scheme {:?}",
            what, raw, other
        ))),
    }
}

pub fn menu() -> Selector {
    Selector::xpath(MENU_XPATH)
}

pub fn ranked_list_link() -> Selector {
    Selector::xpath(format!(
        r#"//*[contains(text(),"{}")]"#,
        RANKED_LIST_LINK_TEXT
    ))
}

pub fn sort_control() -> Selector {
    Selector::xpath(SORT_CONTROL_XPATH)
}

pub fn list_container() -> Selector {
    Selector::xpath(LIST_CONTAINER_XPATH)
}
