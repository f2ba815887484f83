// src/browser/fake.rs
//! Scripted in-memory browser for tests.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;

use super::{Browser, BrowserError, Selector};

#[derive(Default)]
pub(crate) struct ScriptedBrowser {
    /// Selectors that fail with a timeout this many more times.
    failures: Mutex<HashMap<Selector, u32>>,
    /// Selectors that never appear.
    missing: Vec<Selector>,
    html: HashMap<Selector, String>,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) closed: Mutex<bool>,
}

impl ScriptedBrowser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_times(self, target: Selector, n: u32) -> Self {
        self.failures.lock().unwrap().insert(target, n);
        self
    }

    pub(crate) fn never_visible(mut self, target: Selector) -> Self {
        self.missing.push(target);
        self
    }

    pub(crate) fn with_html(mut self, target: Selector, html: impl Into<String>) -> Self {
        self.html.insert(target, html.into());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, target: &Selector) -> Result<(), BrowserError> {
        let timeout = || BrowserError::Timeout {
            target: target.to_string(),
            timeout: Duration::from_millis(1),
        };
        if self.missing.contains(target) {
            return Err(timeout());
        }
        let mut failures = self.failures.lock().unwrap();
        if let Some(left) = failures.get_mut(target) {
            if *left > 0 {
                *left -= 1;
                return Err(timeout());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.record(format!("goto {}", url));
        Ok(())
    }

    async fn wait_visible(&self, target: &Selector) -> Result<(), BrowserError> {
        self.record(format!("wait {}", target));
        self.check(target)
    }

    async fn click(&self, target: &Selector) -> Result<(), BrowserError> {
        self.record(format!("click {}", target));
        self.check(target)
    }

    async fn select_by_label(&self, target: &Selector, label: &str) -> Result<(), BrowserError> {
        self.record(format!("select {} {}", target, label));
        self.check(target)
    }

    async fn inner_html(&self, target: &Selector) -> Result<String, BrowserError> {
        self.record(format!("html {}", target));
        self.check(target)?;
        self.html
            .get(target)
            .cloned()
            .ok_or_else(|| BrowserError::NotFound(target.to_string()))
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError> {
        self.record("screenshot".to_string());
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.record("close".to_string());
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}
