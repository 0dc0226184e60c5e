use crate::dom::{self, FormPage};
use crate::error::Result;
use crate::field::{FieldDescriptor, FieldKind};
use crate::resolve::{is_required, non_empty_attribute, resolve_label, LabelSource};

use super::{Placement, Probe};

/// A date split into month / day / year spin buttons inside a fieldset.
pub(super) async fn extract_date<P: FormPage>(
    page: &P,
    container: &P::Node,
    fieldset: &P::Node,
    placement: &Placement<'_>,
) -> Result<FieldDescriptor> {
    let label = resolve_label(
        page,
        container,
        &[LabelSource::Legend, LabelSource::Attribute(fieldset)],
    )
    .await;
    let required = is_required(page, &label, fieldset).await;

    let id = match page.query_first(Some(fieldset), dom::DATE_WRAPPER).await? {
        Some(wrapper) => non_empty_attribute(page, &wrapper, "id").await?,
        None => None,
    };
    let id = match id {
        Some(id) => Some(id),
        None => non_empty_attribute(page, fieldset, "id").await?,
    };

    let mut parts = Vec::new();
    for selector in [dom::DATE_MONTH, dom::DATE_DAY, dom::DATE_YEAR] {
        if let Some(input) = page.query_first(Some(fieldset), selector).await? {
            parts.push(page.input_value(&input).await?.trim().to_string());
        }
    }

    let current = join_date_parts(&parts).into_iter().collect();
    Ok(placement.descriptor(
        FieldKind::Date,
        &label,
        required,
        placement.id_or_synthetic(id, Probe::Date),
        Vec::new(),
        current,
    ))
}

/// `MM/YYYY`, `MM/DD/YYYY` or `YYYY`, depending on which sub-inputs the
/// widget has. Nothing unless every present part is filled in.
pub fn join_date_parts(parts: &[String]) -> Option<String> {
    if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts.join("/"))
}
