// src/browser/mod.rs
//! The slice of browser automation the pipeline consumes.
//!
//! Stages take `&impl Browser` explicitly; nothing holds a global session.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub mod webdriver;

#[cfg(test)]
pub(crate) mod fake;

pub use webdriver::WebDriverBrowser;

/// How to find one element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(s: impl Into<String>) -> Self {
        Self::Css(s.into())
    }

    pub fn xpath(s: impl Into<String>) -> Self {
        Self::XPath(s.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(s) => write!(f, "css:{}", s),
            Selector::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("timed out after {timeout:?} waiting for {target} to become visible")]
    Timeout { target: String, timeout: Duration },

    #[error("element not found: {0}")]
    NotFound(String),

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("webdriver: {0}")]
    Driver(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BrowserError {
    /// Visibility and interactability problems may clear up on a second try.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BrowserError::Timeout { .. }
                | BrowserError::NotFound(_)
                | BrowserError::NotInteractable(_)
        )
    }
}

/// A live browser session. Every wait is bounded by the implementation's timeout.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Block until `target` is visible, or fail with [`BrowserError::Timeout`].
    async fn wait_visible(&self, target: &Selector) -> Result<(), BrowserError>;

    /// Wait for `target` to be visible, then click it.
    async fn click(&self, target: &Selector) -> Result<(), BrowserError>;

    /// Pick the option whose display text is `label` in a `<select>`.
    async fn select_by_label(&self, target: &Selector, label: &str) -> Result<(), BrowserError>;

    async fn inner_html(&self, target: &Selector) -> Result<String, BrowserError>;

    /// PNG bytes of the current page.
    async fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;

    /// Capture the page to `path`, creating the parent directory if needed.
    async fn save_screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let png = self.screenshot_png().await?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| BrowserError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }
        tokio::fs::write(path, &png)
            .await
            .map_err(|source| BrowserError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), bytes = png.len(), "screenshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BrowserError::NotFound("x".into()).is_transient());
        assert!(BrowserError::NotInteractable("x".into()).is_transient());
        assert!(BrowserError::Timeout {
            target: "x".into(),
            timeout: Duration::from_secs(1)
        }
        .is_transient());
        assert!(!BrowserError::Driver("session gone".into()).is_transient());
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::css("#a").to_string(), "css:#a");
        assert_eq!(Selector::xpath("//div").to_string(), "xpath://div");
    }
}
