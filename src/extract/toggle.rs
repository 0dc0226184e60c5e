use crate::dom::{self, attr_selector, FormPage};
use crate::error::Result;
use crate::field::{FieldDescriptor, FieldKind};
use crate::resolve::{first_text, is_required, non_empty_attribute, resolve_label, LabelSource};

use super::{Placement, Probe};

pub const CHECKBOX_OPTIONS: [&str; 2] = ["Yes", "No"];

pub(super) async fn extract_checkbox<P: FormPage>(
    page: &P,
    container: &P::Node,
    input: &P::Node,
    placement: &Placement<'_>,
) -> Result<FieldDescriptor> {
    let id = non_empty_attribute(page, input, "id").await?;
    let checked = page.is_checked(input).await?;

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

    let state = if checked { CHECKBOX_OPTIONS[0] } else { CHECKBOX_OPTIONS[1] };
    Ok(placement.descriptor(
        FieldKind::Checkbox,
        &label,
        required,
        placement.id_or_synthetic(id, Probe::Checkbox),
        CHECKBOX_OPTIONS.iter().map(|o| o.to_string()).collect(),
        vec![state.to_string()],
    ))
}

/// A fieldset of radio inputs. The group is identified by the element
/// carrying `aria-labelledby` inside the fieldset.
pub(super) async fn extract_radio<P: FormPage>(
    page: &P,
    fieldset: &P::Node,
    placement: &Placement<'_>,
) -> Result<FieldDescriptor> {
    let label = resolve_label(
        page,
        fieldset,
        &[LabelSource::Legend, LabelSource::Attribute(fieldset)],
    )
    .await;
    let required = is_required(page, &label, fieldset).await;

    let group_id = match page.query_first(Some(fieldset), "div[aria-labelledby]").await? {
        Some(group) => match non_empty_attribute(page, &group, "id").await? {
            Some(id) => Some(id),
            None => non_empty_attribute(page, &group, "data-fkit-id").await?,
        },
        None => non_empty_attribute(page, fieldset, "id").await?,
    };

    let mut options = Vec::new();
    let mut selected = Vec::new();
    for radio in page.query_all(Some(fieldset), dom::RADIO_INPUT).await? {
        let option = radio_caption(page, &radio).await?;
        let checked = page.is_checked(&radio).await?
            || page.attribute(&radio, "aria-checked").await?.as_deref() == Some("true");
        if checked {
            selected.push(option.clone());
        }
        options.push(option);
    }

    Ok(placement.descriptor(
        FieldKind::Radio,
        &label,
        required,
        placement.id_or_synthetic(group_id, Probe::Radio),
        options,
        selected,
    ))
}

/// The caption of one radio input, falling back to its `value`.
pub(crate) async fn radio_caption<P: FormPage>(page: &P, radio: &P::Node) -> Result<String> {
    if let Some(id) = non_empty_attribute(page, radio, "id").await? {
        let selector = format!("label{}", attr_selector("for", &id));
        if let Some(text) = first_text(page, None, &selector).await? {
            return Ok(text);
        }
    }
    Ok(page.attribute(radio, "value").await?.unwrap_or_default())
}
