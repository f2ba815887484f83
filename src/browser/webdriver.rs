// src/browser/webdriver.rs
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{
    elements::Element,
    error::{CmdError, ErrorStatus},
    Client, ClientBuilder, Locator,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, trace};

use super::{Browser, BrowserError, Selector};

/// [`Browser`] backed by a WebDriver server (chromedriver, geckodriver).
pub struct WebDriverBrowser {
    client: Client,
    timeout: Duration,
    poll: Duration,
}

impl WebDriverBrowser {
    /// Open a new session on the WebDriver server at `webdriver_url`.
    #[instrument(level = "info", skip(timeout, poll))]
    pub async fn connect(
        webdriver_url: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<Self, BrowserError> {
        let client = ClientBuilder::native()
            .connect(webdriver_url)
            .await
            .map_err(|e| BrowserError::Driver(format!("connecting to {}: {}", webdriver_url, e)))?;
        info!(%webdriver_url, "webdriver session opened");
        Ok(Self {
            client,
            timeout,
            poll,
        })
    }

    async fn find_visible(&self, target: &Selector) -> Result<Element, BrowserError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.client.find(locator(target)).await {
                Ok(el) => match el.is_displayed().await {
                    Ok(true) => return Ok(el),
                    Ok(false) => trace!(%target, "present but hidden"),
                    Err(e) => return Err(classify(target, e)),
                },
                Err(e) if e.is_no_such_element() => trace!(%target, "not present yet"),
                Err(e) => return Err(classify(target, e)),
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    target: target.to_string(),
                    timeout: self.timeout,
                });
            }
            sleep(self.poll).await;
        }
    }
}

fn locator(target: &Selector) -> Locator<'_> {
    match target {
        Selector::Css(s) => Locator::Css(s),
        Selector::XPath(s) => Locator::XPath(s),
    }
}

fn classify(target: &Selector, err: CmdError) -> BrowserError {
    if err.is_no_such_element() {
        return BrowserError::NotFound(target.to_string());
    }
    match err {
        CmdError::Standard(ref wd)
            if matches!(
                wd.error,
                ErrorStatus::ElementNotInteractable
                    | ErrorStatus::ElementClickIntercepted
                    | ErrorStatus::StaleElementReference
            ) =>
        {
            BrowserError::NotInteractable(format!("{}: {}", target, err))
        }
        other => BrowserError::Driver(format!("{}: {}", target, other)),
    }
}

fn driver_err(err: CmdError) -> BrowserError {
    BrowserError::Driver(err.to_string())
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        debug!(%url, "goto");
        self.client.goto(url).await.map_err(driver_err)
    }

    async fn wait_visible(&self, target: &Selector) -> Result<(), BrowserError> {
        self.find_visible(target).await.map(|_| ())
    }

    async fn click(&self, target: &Selector) -> Result<(), BrowserError> {
        let el = self.find_visible(target).await?;
        debug!(%target, "click");
        el.click().await.map_err(|e| classify(target, e))
    }

    async fn select_by_label(&self, target: &Selector, label: &str) -> Result<(), BrowserError> {
        let el = self.find_visible(target).await?;
        debug!(%target, %label, "select by label");
        el.select_by_label(label)
            .await
            .map_err(|e| classify(target, e))
    }

    async fn inner_html(&self, target: &Selector) -> Result<String, BrowserError> {
        let el = self
            .client
            .find(locator(target))
            .await
            .map_err(|e| classify(target, e))?;
        el.html(true).await.map_err(|e| classify(target, e))
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError> {
        self.client.screenshot().await.map_err(driver_err)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.client.clone().close().await.map_err(driver_err)
    }
}
