// src/navigate.rs
use std::{future::Future, path::PathBuf};

use tracing::{error, info, instrument, warn};

use crate::browser::{Browser, BrowserError};
use crate::config::{self, Config};
use crate::error::{PipelineError, Result};
use crate::retry::{retry, RetryPolicy};

/// Drives the session from the landing page to the sorted ranked list.
#[derive(Debug, Clone)]
pub struct Navigator {
    start_url: String,
    retry: RetryPolicy,
    screenshot_path: PathBuf,
}

impl Navigator {
    pub fn new(start_url: impl Into<String>, retry: RetryPolicy, screenshot_path: PathBuf) -> Self {
        Self {
            start_url: start_url.into(),
            retry,
            screenshot_path,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.start_url.clone(), cfg.retry, cfg.screenshot_path())
    }

    /// Load the start page and wait for the navigation menu.
    #[instrument(level = "info", skip_all, fields(url = %self.start_url))]
    pub async fn open<B: Browser + ?Sized>(&self, browser: &B) -> Result<()> {
        let url = self.start_url.as_str();
        let menu = config::menu();
        let menu = &menu;
        self.step(browser, "open", move || async move {
            browser.goto(url).await?;
            browser.wait_visible(menu).await
        })
        .await?;
        info!("start page ready");
        Ok(())
    }

    /// Open the menu, follow the ranked-list link, wait for the sort control.
    #[instrument(level = "info", skip_all)]
    pub async fn go_to_ranked_list<B: Browser + ?Sized>(&self, browser: &B) -> Result<()> {
        let (menu, link, sort) = (
            config::menu(),
            config::ranked_list_link(),
            config::sort_control(),
        );
        let (menu, link, sort) = (&menu, &link, &sort);
        self.step(browser, "go_to_ranked_list", move || async move {
            browser.click(menu).await?;
            browser.click(link).await?;
            browser.wait_visible(sort).await
        })
        .await?;
        info!("ranked list reached");
        Ok(())
    }

    /// Pick `label` in the sort dropdown and wait for the re-rendered list.
    #[instrument(level = "info", skip(self, browser))]
    pub async fn sort_by<B: Browser + ?Sized>(&self, browser: &B, label: &str) -> Result<()> {
        let (sort, list) = (config::sort_control(), config::list_container());
        let (sort, list) = (&sort, &list);
        self.step(browser, "sort_by", move || async move {
            browser.select_by_label(sort, label).await?;
            browser.wait_visible(list).await
        })
        .await?;
        info!(%label, "list sorted");
        Ok(())
    }

    /// Retry `op`; once attempts run out, screenshot the page and surface the error.
    async fn step<B, F, Fut>(&self, browser: &B, step: &'static str, op: F) -> Result<()>
    where
        B: Browser + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<(), BrowserError>>,
    {
        match retry(self.retry, BrowserError::is_transient, op).await {
            Ok(()) => Ok(()),
            Err(source) => {
                error!(step, error = %source, "navigation step failed");
                if let Err(e) = browser.save_screenshot(&self.screenshot_path).await {
                    warn!(error = %e, "could not capture failure screenshot");
                }
                Err(PipelineError::Navigation { step, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::ScriptedBrowser;
    use std::time::Duration;
    use tempfile::tempdir;

    fn navigator(dir: &std::path::Path) -> Navigator {
        Navigator::new(
            "https://example.test",
            RetryPolicy::new(2, Duration::from_millis(1)),
            dir.join("output").join("Last_page_before_error.png"),
        )
    }

    #[tokio::test]
    async fn test_happy_path_call_order() {
        let tmp = tempdir().unwrap();
        let nav = navigator(tmp.path());
        let browser = ScriptedBrowser::new();

        nav.open(&browser).await.unwrap();
        nav.go_to_ranked_list(&browser).await.unwrap();
        nav.sort_by(&browser, "Release Date").await.unwrap();

        assert_eq!(
            browser.calls(),
            vec![
                "goto https://example.test".to_string(),
                format!("wait {}", config::menu()),
                format!("click {}", config::menu()),
                format!("click {}", config::ranked_list_link()),
                format!("wait {}", config::sort_control()),
                format!("select {} Release Date", config::sort_control()),
                format!("wait {}", config::list_container()),
            ]
        );
        assert!(!tmp.path().join("output").exists());
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let tmp = tempdir().unwrap();
        let nav = navigator(tmp.path());
        let browser = ScriptedBrowser::new().fail_times(config::ranked_list_link(), 1);

        nav.go_to_ranked_list(&browser).await.unwrap();

        let clicks = browser
            .calls()
            .iter()
            .filter(|c| c.starts_with("click"))
            .count();
        // menu, link (fails), menu again, link
        assert_eq!(clicks, 4);
        assert!(!browser.calls().contains(&"screenshot".to_string()));
    }

    #[tokio::test]
    async fn test_exhausted_retries_capture_screenshot() {
        let tmp = tempdir().unwrap();
        let nav = navigator(tmp.path());
        let browser = ScriptedBrowser::new().never_visible(config::list_container());

        let err = nav.sort_by(&browser, "Release Date").await.unwrap_err();

        match err {
            PipelineError::Navigation { step, source } => {
                assert_eq!(step, "sort_by");
                assert!(source.is_transient());
            }
            other => panic!("unexpected error: {other}"),
        }
        let selects = browser
            .calls()
            .iter()
            .filter(|c| c.starts_with("select"))
            .count();
        assert_eq!(selects, 2);
        assert!(tmp
            .path()
            .join("output")
            .join("Last_page_before_error.png")
            .exists());
    }
}
