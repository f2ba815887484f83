// src/extract.rs
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, instrument};

use crate::browser::{Browser, Selector};
use crate::error::{PipelineError, Result};

/// Read the inner markup of `container` and write it verbatim to `dest`.
///
/// The container is expected to be visible already; a lookup failure here is
/// reported as a navigation error on the `extract` step.
#[instrument(level = "info", skip(browser, dest), fields(dest = %dest.as_ref().display()))]
pub async fn save_markup<B: Browser + ?Sized>(
    browser: &B,
    container: &Selector,
    dest: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest = dest.as_ref();
    let html = browser
        .inner_html(container)
        .await
        .map_err(|source| PipelineError::Navigation {
            step: "extract",
            source,
        })?;

    fs::write(dest, html.as_bytes())
        .await
        .map_err(|e| PipelineError::io(dest, e))?;
    info!(bytes = html.len(), "markup snapshot saved");
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::ScriptedBrowser;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_markup_written_verbatim() {
        let tmp = tempdir().unwrap();
        let lister = Selector::css(".lister");
        let markup = "<table>\n  <tr><th> Rank </th></tr>\n</table>";
        let browser = ScriptedBrowser::new().with_html(lister.clone(), markup);

        let path = save_markup(&browser, &lister, tmp.path().join("innerhtml.html"))
            .await
            .unwrap();

        assert_eq!(path, tmp.path().join("innerhtml.html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), markup);
    }

    #[tokio::test]
    async fn test_unwritable_destination_is_io_error() {
        let tmp = tempdir().unwrap();
        let lister = Selector::css(".lister");
        let browser = ScriptedBrowser::new().with_html(lister.clone(), "<table></table>");

        let err = save_markup(&browser, &lister, tmp.path().join("missing").join("x.html"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
