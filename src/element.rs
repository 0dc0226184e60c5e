use chromiumoxide::element::Element as CrElement;

use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Element, providing a simplified API.
pub struct Element {
    inner: CrElement,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.inner.backend_node_id == other.inner.backend_node_id
    }
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying chromiumoxide Element.
    pub fn inner(&self) -> &CrElement {
        &self.inner
    }

    /// Click this element (scrolls into view first).
    pub async fn click(&self) -> Result<()> {
        self.inner.click().await.map_err(Error::CdpError)?;
        Ok(())
    }

    /// Type text into this element (wraps type_str).
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.inner.type_str(text).await.map_err(Error::CdpError)?;
        Ok(())
    }

    /// Focus this element and select its current content, so that typing
    /// replaces it.
    pub async fn focus_and_select(&self) -> Result<()> {
        self.call_js("function() { this.focus(); if (this.select) { this.select(); } }")
            .await?;
        Ok(())
    }

    /// Press a key on this element (e.g. "Enter", "Tab").
    pub async fn press_key(&self, key: &str) -> Result<()> {
        self.inner.press_key(key).await.map_err(Error::CdpError)?;
        Ok(())
    }

    /// Get the inner text of this element; empty when it has none.
    pub async fn inner_text(&self) -> Result<String> {
        Ok(self
            .inner
            .inner_text()
            .await
            .map_err(Error::CdpError)?
            .unwrap_or_default())
    }

    /// Get the value of an attribute on this element.
    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner.attribute(name).await.map_err(Error::CdpError)
    }

    /// The live `value` property of an input, select or textarea.
    pub async fn input_value(&self) -> Result<String> {
        let value = self
            .call_js("function() { return this.value == null ? '' : String(this.value); }")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// The live `checked` property of a checkbox or radio input.
    pub async fn is_checked(&self) -> Result<bool> {
        let value = self.call_js("function() { return !!this.checked; }").await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Find all child elements matching the given CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(Error::CdpError)?;
        Ok(els.into_iter().map(Element::new).collect())
    }

    async fn call_js(&self, function: &str) -> Result<serde_json::Value> {
        let returns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(Error::CdpError)?;
        if let Some(details) = returns.exception_details {
            return Err(Error::JsError(details.text));
        }
        Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
    }
}
