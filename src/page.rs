use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;

use crate::dom::{FormPage, Navigator};
use crate::element::Element;
use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Page that drives the form extractor.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self {
            inner,
            default_timeout,
        }
    }

    /// Returns a reference to the underlying chromiumoxide Page.
    pub fn inner(&self) -> &CrPage {
        &self.inner
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Get the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?
            .ok_or_else(|| Error::NavigationError("No URL found".into()))
    }

    /// Wait for a navigation to complete.
    pub async fn wait_for_navigation(&self) -> Result<()> {
        self.inner
            .wait_for_navigation()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// Find all elements matching the given CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(els.into_iter().map(Element::new).collect())
    }
}

#[async_trait]
impl FormPage for Page {
    type Node = Element;

    async fn query_all(&self, scope: Option<&Element>, selector: &str) -> Result<Vec<Element>> {
        match scope {
            Some(element) => element.find_elements(selector).await,
            None => self.find_elements(selector).await,
        }
    }

    async fn attribute(&self, node: &Element, name: &str) -> Result<Option<String>> {
        node.get_attribute(name).await
    }

    async fn inner_text(&self, node: &Element) -> Result<String> {
        node.inner_text().await
    }

    async fn input_value(&self, node: &Element) -> Result<String> {
        node.input_value().await
    }

    async fn is_checked(&self, node: &Element) -> Result<bool> {
        node.is_checked().await
    }

    async fn click(&self, node: &Element) -> Result<()> {
        node.click().await
    }

    async fn fill(&self, node: &Element, text: &str) -> Result<()> {
        node.click().await?;
        node.focus_and_select().await?;
        node.type_text(text).await
    }

    /// Uses CDP keyboard events against the document body.
    async fn press_key(&self, key: &str) -> Result<()> {
        let body = self
            .find_elements("body")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ElementNotFound("body".into()))?;
        body.press_key(key).await
    }

    async fn set_input_files(&self, node: &Element, files: &[PathBuf]) -> Result<()> {
        let params = SetFileInputFilesParams::builder()
            .files(files.iter().map(|f| f.to_string_lossy().into_owned()))
            .backend_node_id(node.inner().backend_node_id)
            .build()
            .map_err(Error::JsError)?;
        self.inner.execute(params).await?;
        Ok(())
    }
}

#[async_trait]
impl Navigator for Page {
    /// Navigate to the given URL and wait for the page to load, bounded by
    /// the configured default timeout.
    async fn goto(&self, url: &str) -> Result<()> {
        let navigation = async {
            self.inner
                .goto(url)
                .await
                .map_err(|e| Error::NavigationError(e.to_string()))?;
            self.wait_for_navigation().await
        };
        tokio::time::timeout(self.default_timeout, navigation)
            .await
            .map_err(|_| Error::Timeout(format!("navigation to {url}")))?
    }

    /// Take a full-page screenshot and save it to a file.
    async fn screenshot_to_file(&self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.inner
            .save_screenshot(params, path)
            .await
            .map_err(|e| Error::ScreenshotError(e.to_string()))?;
        Ok(())
    }
}
