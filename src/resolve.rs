//! Label and required-ness resolution shared by every field kind.

use tracing::debug;

use crate::dom::{attr_selector, FormPage};
use crate::error::Result;
use crate::field::UNKNOWN_LABEL;

const REQUIRED_MARKER: char = '*';

/// One place a field's caption may come from. Sources are tried in the
/// order given and the first non-empty text wins.
pub enum LabelSource<'a, N> {
    /// The legend of the container's fieldset: rich text first, then a
    /// nested `label`, then the legend itself.
    Legend,
    /// A `label` whose `for` points at the given id.
    LabelFor(&'a str),
    /// The element(s) named by the node's `aria-labelledby`.
    LabelledBy(&'a N),
    /// The first `label` anywhere in the container.
    AnyLabel,
    /// The node's `aria-label`, then its `title`.
    Attribute(&'a N),
}

/// Caption text as found on the page, decoration included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLabel(pub String);

impl RawLabel {
    pub fn unknown() -> Self {
        RawLabel(UNKNOWN_LABEL.to_string())
    }

    pub fn has_required_marker(&self) -> bool {
        self.0.contains(REQUIRED_MARKER)
    }

    /// The caption without surrounding whitespace and required markers.
    pub fn cleaned(&self) -> String {
        clean_label(&self.0)
    }
}

pub fn clean_label(text: &str) -> String {
    text.trim()
        .trim_matches(REQUIRED_MARKER)
        .trim()
        .to_string()
}

/// Resolve a caption by trying `sources` in order, falling back to
/// `"Unknown"` when none yields text.
pub async fn resolve_label<P: FormPage>(
    page: &P,
    container: &P::Node,
    sources: &[LabelSource<'_, P::Node>],
) -> RawLabel {
    for source in sources {
        match try_source(page, container, source).await {
            Ok(Some(text)) => return RawLabel(text),
            Ok(None) => {}
            Err(e) => debug!("label source failed: {e}"),
        }
    }
    RawLabel::unknown()
}

async fn try_source<P: FormPage>(
    page: &P,
    container: &P::Node,
    source: &LabelSource<'_, P::Node>,
) -> Result<Option<String>> {
    match source {
        LabelSource::Legend => {
            for selector in [
                r#"fieldset legend div[data-automation-id="richText"] p"#,
                "fieldset legend label",
                "fieldset legend",
            ] {
                if let Some(text) = first_text(page, Some(container), selector).await? {
                    return Ok(Some(text));
                }
            }
            Ok(None)
        }
        LabelSource::LabelFor(id) if !id.is_empty() => {
            let selector = format!("label{}", attr_selector("for", id));
            first_text(page, Some(container), &selector).await
        }
        LabelSource::LabelFor(_) => Ok(None),
        LabelSource::LabelledBy(node) => {
            let Some(ids) = page.attribute(node, "aria-labelledby").await? else {
                return Ok(None);
            };
            let mut parts = Vec::new();
            for id in ids.split_whitespace() {
                if let Some(text) = first_text(page, None, &attr_selector("id", id)).await? {
                    parts.push(text);
                }
            }
            Ok(non_empty(parts.join(" ")))
        }
        LabelSource::AnyLabel => first_text(page, Some(container), "label").await,
        LabelSource::Attribute(node) => {
            for name in ["aria-label", "title"] {
                if let Some(value) = page.attribute(node, name).await? {
                    if let Some(value) = non_empty(value) {
                        return Ok(Some(value));
                    }
                }
            }
            Ok(None)
        }
    }
}

/// Whether a field must be answered: a marker in its caption, an
/// `aria-required` flag, or "Required" in its accessible name or
/// description.
pub async fn is_required<P: FormPage>(page: &P, label: &RawLabel, primary: &P::Node) -> bool {
    if label.has_required_marker() {
        return true;
    }
    match accessible_required(page, primary).await {
        Ok(required) => required,
        Err(e) => {
            debug!("required lookup failed: {e}");
            false
        }
    }
}

async fn accessible_required<P: FormPage>(page: &P, node: &P::Node) -> Result<bool> {
    if page.attribute(node, "aria-required").await?.as_deref() == Some("true") {
        return Ok(true);
    }
    if page
        .attribute(node, "aria-label")
        .await?
        .is_some_and(|label| label.contains("Required"))
    {
        return Ok(true);
    }
    if let Some(ids) = page.attribute(node, "aria-describedby").await? {
        for id in ids.split_whitespace() {
            if let Some(text) = first_text(page, None, &attr_selector("id", id)).await? {
                if text.contains("Required") {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

/// Trimmed text of the first match, if any and non-empty.
pub async fn first_text<P: FormPage>(
    page: &P,
    scope: Option<&P::Node>,
    selector: &str,
) -> Result<Option<String>> {
    match page.query_first(scope, selector).await? {
        Some(node) => Ok(non_empty(page.inner_text(&node).await?)),
        None => Ok(None),
    }
}

/// Trimmed, non-empty texts of every match.
pub async fn all_texts<P: FormPage>(
    page: &P,
    scope: Option<&P::Node>,
    selector: &str,
) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for node in page.query_all(scope, selector).await? {
        if let Some(text) = non_empty(page.inner_text(&node).await?) {
            texts.push(text);
        }
    }
    Ok(texts)
}

pub async fn non_empty_attribute<P: FormPage>(
    page: &P,
    node: &P::Node,
    name: &str,
) -> Result<Option<String>> {
    Ok(page.attribute(node, name).await?.and_then(non_empty))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_stripped_from_both_ends() {
        assert_eq!(clean_label("First Name*"), "First Name");
        assert_eq!(clean_label("  *Email Address "), "Email Address");
        assert_eq!(clean_label("Phone Number * "), "Phone Number");
        assert_eq!(clean_label("City"), "City");
    }

    #[test]
    fn marker_detection() {
        assert!(RawLabel("Country*".into()).has_required_marker());
        assert!(!RawLabel("Country".into()).has_required_marker());
        assert_eq!(RawLabel::unknown().cleaned(), UNKNOWN_LABEL);
    }
}
