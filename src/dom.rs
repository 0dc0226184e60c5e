//! The page-automation seam the extractor drives.
//!
//! Everything the extraction and filling code knows about a page goes
//! through [`FormPage`]. The chromiumoxide-backed [`crate::Page`] is the
//! production implementation.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{Error, Result};

// Workday automation hooks.
pub const FORM_FIELD: &str = r#"[data-automation-id^="formField-"]"#;
pub const MULTI_SELECT_CONTAINER: &str = r#"[data-automation-id="multiSelectContainer"]"#;
pub const MULTI_SELECT_BUTTON: &str = r#"[data-automation-id="dropdownButton"]"#;
pub const MULTI_SELECT_OPTION: &str =
    r#"[data-automation-id="picklistOption"], [data-automation-id="promptOption"]"#;
pub const PILL: &str = r#"[data-automation-id="pill"]"#;
pub const LISTBOX_TRIGGER: &str = r#"[aria-haspopup="listbox"]"#;
pub const LISTBOX_OPTION: &str =
    r#"[role="listbox"] [role="option"], [data-automation-id="picklistOption"]"#;
pub const CHOICE_OPTION: &str = r#"[role="option"], [data-automation-id="promptOption"], [data-automation-id="picklistOption"]"#;
pub const TEXT_INPUT: &str = r#"input[type="text"]:not([role="spinbutton"])"#;
pub const CHECKBOX_INPUT: &str = r#"input[type="checkbox"]"#;
pub const RADIO_INPUT: &str = r#"input[type="radio"]"#;
pub const TEXTAREA: &str = "textarea";
pub const DATE_PART: &str = r#"input[role="spinbutton"]"#;
pub const DATE_WRAPPER: &str = r#"[data-automation-id="dateInputWrapper"]"#;
pub const DATE_MONTH: &str =
    r#"input[aria-label="Month"], input[data-automation-id="dateSectionMonth-input"]"#;
pub const DATE_DAY: &str =
    r#"input[aria-label="Day"], input[data-automation-id="dateSectionDay-input"]"#;
pub const DATE_YEAR: &str =
    r#"input[aria-label="Year"], input[data-automation-id="dateSectionYear-input"]"#;
pub const FILE_UPLOAD: &str = r#"[data-automation-id="attachments-FileUpload"]"#;
pub const FILE_INPUT: &str = r#"input[type="file"]"#;
pub const SELECT_FILES_BUTTON: &str = r#"[data-automation-id="select-files"]"#;
pub const UPLOADED_FILE: &str =
    r#"[data-automation-id*="file-item"], .uploaded-file, .file-name"#;
pub const SECTION_HEADER: &str = r#"h3[id$="-section"]"#;
pub const ADD_BUTTON: &str = r#"[data-automation-id="add-button"]"#;
pub const SECTION_INSTANCE: &str = r#"[role="group"][aria-labelledby$="-panel"]"#;
pub const PROGRESS_ITEM: &str = r#"[data-automation-id^="progressBar"] li"#;
pub const PROGRESS_ACTIVE: &str = "progressBarActiveStep";
pub const NEXT_BUTTON: &str = r#"button[data-automation-id="pageFooterNextButton"]"#;
pub const ERROR_BANNER: &str = r#"[data-automation-id="errorBanner"]"#;

/// Build an exact-match attribute selector, quoting the value.
pub fn attr_selector(name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"[{name}="{escaped}"]"#)
}

/// Async, element-level access to one browser page.
///
/// Queries are scoped to the descendants of `scope` when one is given, and
/// to the whole document otherwise. A query with no matches is an empty
/// vector, not an error.
#[async_trait]
pub trait FormPage: Send + Sync {
    /// Equal handles refer to the same element.
    type Node: PartialEq + Send + Sync;

    async fn query_all(&self, scope: Option<&Self::Node>, selector: &str) -> Result<Vec<Self::Node>>;

    async fn attribute(&self, node: &Self::Node, name: &str) -> Result<Option<String>>;

    async fn inner_text(&self, node: &Self::Node) -> Result<String>;

    /// The live `value` property, which may differ from the attribute.
    async fn input_value(&self, node: &Self::Node) -> Result<String>;

    /// The live `checked` property.
    async fn is_checked(&self, node: &Self::Node) -> Result<bool>;

    async fn click(&self, node: &Self::Node) -> Result<()>;

    /// Replace the element's value with `text`, as if typed.
    async fn fill(&self, node: &Self::Node, text: &str) -> Result<()>;

    /// Press a key against the focused element (e.g. "Escape", "Enter").
    async fn press_key(&self, key: &str) -> Result<()>;

    async fn set_input_files(&self, node: &Self::Node, files: &[PathBuf]) -> Result<()>;

    async fn query_first(&self, scope: Option<&Self::Node>, selector: &str) -> Result<Option<Self::Node>> {
        Ok(self.query_all(scope, selector).await?.into_iter().next())
    }

    async fn count(&self, scope: Option<&Self::Node>, selector: &str) -> Result<usize> {
        Ok(self.query_all(scope, selector).await?.len())
    }

    /// Poll until at least `min` elements match, or fail with
    /// [`Error::Timeout`] once `timeout` has elapsed.
    async fn wait_for_count(
        &self,
        scope: Option<&Self::Node>,
        selector: &str,
        min: usize,
        timeout: Duration,
        poll: Duration,
    ) -> Result<Vec<Self::Node>> {
        let start = Instant::now();
        loop {
            let found = self.query_all(scope, selector).await?;
            if found.len() >= min {
                return Ok(found);
            }
            if start.elapsed() >= timeout {
                return Err(Error::Timeout(format!(
                    "{min} element(s) matching {selector} (found {})",
                    found.len()
                )));
            }
            tokio::time::sleep(poll).await;
        }
    }
}

/// Page-level capabilities needed outside of form extraction.
#[async_trait]
pub trait Navigator: FormPage {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn screenshot_to_file(&self, path: &std::path::Path) -> Result<()>;
}

/// Find the first element matching `selector` whose trimmed text equals
/// `text`, ignoring case.
pub async fn find_by_text<P: FormPage + ?Sized>(
    page: &P,
    scope: Option<&P::Node>,
    selector: &str,
    text: &str,
) -> Result<Option<P::Node>> {
    for node in page.query_all(scope, selector).await? {
        if page.inner_text(&node).await?.trim().eq_ignore_ascii_case(text) {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_selector_quotes_values() {
        assert_eq!(attr_selector("id", "name--legalName"), r#"[id="name--legalName"]"#);
        assert_eq!(attr_selector("for", r#"a"b"#), r#"[for="a\"b"]"#);
    }
}
