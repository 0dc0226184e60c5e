//! Field classification and the kind-specific extractors.
//!
//! [`classify`] looks at one field container, decides which interaction
//! pattern it implements and hands it to the matching extractor. The
//! probes run in a fixed order and the first one that detects its control
//! owns the container: a dropdown is often a fieldset that also looks like
//! a radio group and carries a hidden text input, so it must be tested
//! before either.

mod date;
mod dropdown;
mod file;
mod popup;
mod text;
mod toggle;

use tracing::debug;

use crate::config::Timeouts;
use crate::dom::{self, FormPage};
use crate::error::Result;
use crate::field::{FieldDescriptor, FieldKind};
use crate::resolve::RawLabel;

pub use popup::{with_open_popup, Dismiss};
pub(crate) use toggle::radio_caption;

/// Probe order. An earlier match suppresses every later probe for the
/// same container.
pub const PRECEDENCE: [Probe; 8] = [
    Probe::MultiSelect,
    Probe::DropdownButton,
    Probe::Radio,
    Probe::Text,
    Probe::Checkbox,
    Probe::Textarea,
    Probe::Date,
    Probe::FileUpload,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    MultiSelect,
    DropdownButton,
    Radio,
    Text,
    Checkbox,
    Textarea,
    Date,
    FileUpload,
}

impl Probe {
    /// Prefix of identifiers synthesized for controls that carry none.
    pub fn slug(self) -> &'static str {
        match self {
            Probe::MultiSelect => "multi-select",
            Probe::DropdownButton => "dropdown-button",
            Probe::Radio => "radio",
            Probe::Text => "text",
            Probe::Checkbox => "checkbox",
            Probe::Textarea => "textarea",
            Probe::Date => "date",
            Probe::FileUpload => "file-upload",
        }
    }

    /// The control this probe recognizes inside `container`, if present.
    async fn detect<P: FormPage>(self, page: &P, container: &P::Node) -> Result<Option<P::Node>> {
        let scope = Some(container);
        match self {
            Probe::MultiSelect => page.query_first(scope, dom::MULTI_SELECT_CONTAINER).await,
            Probe::DropdownButton => page.query_first(scope, dom::LISTBOX_TRIGGER).await,
            Probe::Radio => {
                for fieldset in page.query_all(scope, "fieldset").await? {
                    if page.count(Some(&fieldset), dom::RADIO_INPUT).await? > 0 {
                        return Ok(Some(fieldset));
                    }
                }
                Ok(None)
            }
            Probe::Text => page.query_first(scope, dom::TEXT_INPUT).await,
            Probe::Checkbox => page.query_first(scope, dom::CHECKBOX_INPUT).await,
            Probe::Textarea => page.query_first(scope, dom::TEXTAREA).await,
            Probe::Date => {
                if page.count(scope, dom::DATE_PART).await? == 0 {
                    return Ok(None);
                }
                page.query_first(scope, "fieldset").await
            }
            Probe::FileUpload => page.query_first(scope, dom::FILE_UPLOAD).await,
        }
    }
}

/// Whether `id` was synthesized by [`Placement::synthetic_id`] rather than
/// read from the page.
pub fn is_synthetic_id(id: &str) -> bool {
    let local = id.rsplit_once('/').map_or(id, |(_, local)| local);
    local.rsplit_once('-').is_some_and(|(slug, ordinal)| {
        ordinal.parse::<usize>().is_ok() && PRECEDENCE.iter().any(|probe| probe.slug() == slug)
    })
}

/// Where a container sits within the extraction pass.
#[derive(Debug, Clone)]
pub struct Placement<'a> {
    pub section_name: &'a str,
    /// Prepended to synthesized identifiers so that instances of a section
    /// never collide with each other or with top-level fields.
    pub id_prefix: &'a str,
    /// Position of the container within its scan.
    pub ordinal: usize,
}

impl Placement<'_> {
    pub fn synthetic_id(&self, probe: Probe) -> String {
        format!("{}{}-{}", self.id_prefix, probe.slug(), self.ordinal)
    }

    /// `id` if the page supplied one, otherwise a synthesized identifier.
    fn id_or_synthetic(&self, id: Option<String>, probe: Probe) -> String {
        id.filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.synthetic_id(probe))
    }

    fn descriptor(
        &self,
        kind: FieldKind,
        label: &RawLabel,
        required: bool,
        input_id: String,
        options: Vec<String>,
        current_values: Vec<String>,
    ) -> FieldDescriptor {
        FieldDescriptor {
            label: label.cleaned(),
            input_id,
            required,
            kind,
            options,
            current_values,
            section_name: self.section_name.to_string(),
        }
    }
}

/// Classify one field container and extract its descriptor.
///
/// `Ok(None)` means the container holds no recognized control. An error
/// from the owning extractor is returned as-is; later probes are not
/// consulted.
pub async fn classify<P: FormPage>(
    page: &P,
    container: &P::Node,
    placement: &Placement<'_>,
    timeouts: &Timeouts,
) -> Result<Option<FieldDescriptor>> {
    for probe in PRECEDENCE {
        let Some(control) = probe.detect(page, container).await? else {
            continue;
        };
        debug!(probe = probe.slug(), ordinal = placement.ordinal, "container matched");
        let field = match probe {
            Probe::MultiSelect => {
                dropdown::extract_multi_select(page, container, &control, placement, timeouts).await?
            }
            Probe::DropdownButton => {
                dropdown::extract_dropdown(page, container, &control, placement, timeouts).await?
            }
            Probe::Radio => toggle::extract_radio(page, &control, placement).await?,
            Probe::Text => {
                text::extract_text(page, container, &control, placement, FieldKind::Text).await?
            }
            Probe::Checkbox => toggle::extract_checkbox(page, container, &control, placement).await?,
            Probe::Textarea => {
                text::extract_text(page, container, &control, placement, FieldKind::Textarea).await?
            }
            Probe::Date => date::extract_date(page, container, &control, placement).await?,
            Probe::FileUpload => file::extract_file_upload(page, container, &control, placement).await?,
        };
        return Ok(Some(field));
    }
    Ok(None)
}
