//! The single entry point for reading every field on the visible page.

use std::collections::HashSet;

use tracing::{debug, error};

use crate::config::ExtractOptions;
use crate::dom::{self, FormPage};
use crate::extract::{classify, Placement};
use crate::field::{FieldDescriptor, MAIN_SECTION};
use crate::sections::{discover_sections, owned_containers, section_fields};

/// Descriptors in first-seen order, unique by [`FieldDescriptor::dedup_key`].
#[derive(Debug, Default)]
pub struct FieldSet {
    seen: HashSet<String>,
    fields: Vec<FieldDescriptor>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field` unless one with the same key is already present.
    /// Returns whether it was added.
    pub fn push(&mut self, field: FieldDescriptor) -> bool {
        if !self.seen.insert(field.dedup_key()) {
            debug!(key = %field.dedup_key(), "duplicate field dropped");
            return false;
        }
        self.fields.push(field);
        true
    }

    pub fn extend(&mut self, fields: impl IntoIterator<Item = FieldDescriptor>) {
        for field in fields {
            self.push(field);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldDescriptor> {
        self.fields
    }
}

/// Every field of the current step, dynamic sections included, using
/// default timeouts.
pub async fn extract_all_form_fields<P: FormPage>(page: &P) -> Vec<FieldDescriptor> {
    extract_form_fields(page, &ExtractOptions::default(), true).await
}

/// Every field of the visible page area.
///
/// Top-level containers come first, in document order, tagged
/// `section_name = "main"`. Containers inside a section group follow,
/// tagged with the section title. Unless `include_sections` is false,
/// sections are also topped up with added entries. Failures are logged and
/// only cost the affected field; this never fails as a whole.
pub async fn extract_form_fields<P: FormPage>(
    page: &P,
    options: &ExtractOptions,
    include_sections: bool,
) -> Vec<FieldDescriptor> {
    let mut fields = FieldSet::new();
    let sections = discover_sections(page).await;
    let owned = owned_containers(page, &sections).await;

    match page.query_all(None, dom::FORM_FIELD).await {
        Ok(containers) => {
            for (index, container) in containers.iter().enumerate() {
                if owned.contains(container) {
                    continue;
                }
                let placement = Placement {
                    section_name: MAIN_SECTION,
                    id_prefix: "",
                    ordinal: index,
                };
                match classify(page, container, &placement, &options.timeouts).await {
                    Ok(Some(field)) => {
                        fields.push(field);
                    }
                    Ok(None) => debug!(index, "container has no known control"),
                    Err(e) => error!(index, "field extraction failed: {e}"),
                }
            }
        }
        Err(e) => error!("could not list field containers: {e}"),
    }

    fields.extend(section_fields(page, &sections, options, include_sections).await);

    fields.into_vec()
}
