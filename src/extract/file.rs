use crate::dom::{self, FormPage};
use crate::error::Result;
use crate::field::{FieldDescriptor, FieldKind};
use crate::resolve::{all_texts, is_required, non_empty_attribute, resolve_label, LabelSource};

use super::{Placement, Probe};

pub const FILE_OPTIONS: [&str; 2] = ["Select file", "Drop file"];

pub(super) async fn extract_file_upload<P: FormPage>(
    page: &P,
    container: &P::Node,
    upload: &P::Node,
    placement: &Placement<'_>,
) -> Result<FieldDescriptor> {
    let label = resolve_label(
        page,
        container,
        &[
            LabelSource::Legend,
            LabelSource::LabelledBy(upload),
            LabelSource::AnyLabel,
            LabelSource::Attribute(upload),
        ],
    )
    .await;

    let file_input = page.query_first(Some(upload), dom::FILE_INPUT).await?;
    let (mut id, multiple) = match &file_input {
        Some(input) => (
            non_empty_attribute(page, input, "id").await?,
            page.attribute(input, "multiple").await?.is_some(),
        ),
        None => (None, false),
    };
    if id.is_none() {
        if let Some(button) = page.query_first(Some(upload), dom::SELECT_FILES_BUTTON).await? {
            id = non_empty_attribute(page, &button, "id").await?;
        }
    }

    let required = match &file_input {
        Some(input) => is_required(page, &label, input).await,
        None => is_required(page, &label, upload).await,
    };
    let kind = if multiple {
        FieldKind::MultipleFile
    } else {
        FieldKind::SingleFile
    };
    let uploaded = all_texts(page, Some(upload), dom::UPLOADED_FILE).await?;

    Ok(placement.descriptor(
        kind,
        &label,
        required,
        placement.id_or_synthetic(id, Probe::FileUpload),
        FILE_OPTIONS.iter().map(|o| o.to_string()).collect(),
        uploaded,
    ))
}
