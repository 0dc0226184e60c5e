use tracing::warn;

use crate::config::Timeouts;
use crate::dom::{self, FormPage};
use crate::error::Result;
use crate::field::{FieldDescriptor, FieldKind};
use crate::resolve::{all_texts, is_required, non_empty_attribute, resolve_label, LabelSource};

use super::popup::{read_options, with_open_popup, Dismiss};
use super::{Placement, Probe};

/// Trigger captions shown while nothing is selected.
const PLACEHOLDERS: [&str; 3] = ["select one", "select", ""];

pub fn is_placeholder(caption: &str) -> bool {
    let caption = caption.trim().to_lowercase();
    PLACEHOLDERS.contains(&caption.as_str())
}

/// A button that opens a listbox popup.
pub(super) async fn extract_dropdown<P: FormPage>(
    page: &P,
    container: &P::Node,
    trigger: &P::Node,
    placement: &Placement<'_>,
    timeouts: &Timeouts,
) -> Result<FieldDescriptor> {
    let id = non_empty_attribute(page, trigger, "id").await?;
    let caption = page.inner_text(trigger).await?.trim().to_string();

    let label = resolve_label(
        page,
        container,
        &[
            LabelSource::Legend,
            LabelSource::LabelFor(id.as_deref().unwrap_or_default()),
            LabelSource::Attribute(trigger),
        ],
    )
    .await;
    let required = is_required(page, &label, trigger).await;
    let input_id = placement.id_or_synthetic(id, Probe::DropdownButton);

    let options = with_open_popup(page, trigger, Dismiss::Escape, || {
        read_options(page, dom::LISTBOX_OPTION, timeouts)
    })
    .await
    .inspect_err(|e| warn!(field = %input_id, "could not read dropdown options: {e}"))?;

    let current = if is_placeholder(&caption) { Vec::new() } else { vec![caption] };
    Ok(placement.descriptor(
        FieldKind::DropdownButton,
        &label,
        required,
        input_id,
        options,
        current,
    ))
}

/// A multi-select: selected values are shown as pills, and the full list
/// of choices sits behind the container's own dropdown button.
pub(super) async fn extract_multi_select<P: FormPage>(
    page: &P,
    container: &P::Node,
    select: &P::Node,
    placement: &Placement<'_>,
    timeouts: &Timeouts,
) -> Result<FieldDescriptor> {
    let id = non_empty_attribute(page, select, "id").await?;

    let label = resolve_label(
        page,
        container,
        &[
            LabelSource::Legend,
            LabelSource::LabelFor(id.as_deref().unwrap_or_default()),
            LabelSource::AnyLabel,
            LabelSource::Attribute(select),
        ],
    )
    .await;
    let required = is_required(page, &label, select).await;
    let input_id = placement.id_or_synthetic(id, Probe::MultiSelect);

    let selected = all_texts(page, Some(select), dom::PILL).await?;

    let options = match page.query_first(Some(select), dom::MULTI_SELECT_BUTTON).await? {
        Some(button) => with_open_popup(page, &button, Dismiss::Toggle, || {
            read_options(page, dom::MULTI_SELECT_OPTION, timeouts)
        })
        .await
        .inspect_err(|e| warn!(field = %input_id, "could not read multi-select options: {e}"))?,
        None => Vec::new(),
    };

    Ok(placement.descriptor(
        FieldKind::MultiSelect,
        &label,
        required,
        input_id,
        options,
        selected,
    ))
}
