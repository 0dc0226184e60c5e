use crate::dom::FormPage;
use crate::error::Result;
use crate::field::{FieldDescriptor, FieldKind};
use crate::resolve::{is_required, non_empty_attribute, resolve_label, LabelSource};

use super::{Placement, Probe};

/// Single-line inputs and textareas share everything but their kind.
pub(super) async fn extract_text<P: FormPage>(
    page: &P,
    container: &P::Node,
    input: &P::Node,
    placement: &Placement<'_>,
    kind: FieldKind,
) -> Result<FieldDescriptor> {
    let probe = if kind == FieldKind::Textarea {
        Probe::Textarea
    } else {
        Probe::Text
    };
    let id = non_empty_attribute(page, input, "id").await?;
    let value = page.input_value(input).await?;

    let label = resolve_label(
        page,
        container,
        &[
            LabelSource::Legend,
            LabelSource::LabelFor(id.as_deref().unwrap_or_default()),
            LabelSource::Attribute(input),
        ],
    )
    .await;
    let required = is_required(page, &label, input).await;

    let current = if value.is_empty() { Vec::new() } else { vec![value] };
    Ok(placement.descriptor(
        kind,
        &label,
        required,
        placement.id_or_synthetic(id, probe),
        Vec::new(),
        current,
    ))
}
