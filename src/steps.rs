//! The wizard's progress indicator and the per-step walk built on it.

use tracing::{error, info};

use crate::aggregate::extract_form_fields;
use crate::config::ExtractOptions;
use crate::dom::{self, FormPage};
use crate::error::Result;
use crate::field::{FormSnapshot, StepDescriptor};

/// Read the progress indicator into its steps, in display order.
///
/// An empty result means the indicator could not be read, not that the
/// form has no steps.
pub async fn read_progress<P: FormPage>(page: &P) -> Vec<StepDescriptor> {
    match try_read_progress(page).await {
        Ok(steps) => steps,
        Err(e) => {
            error!("could not read progress indicator: {e}");
            Vec::new()
        }
    }
}

async fn try_read_progress<P: FormPage>(page: &P) -> Result<Vec<StepDescriptor>> {
    let mut steps = Vec::new();
    for item in page.query_all(None, dom::PROGRESS_ITEM).await? {
        // The first label is the status icon's accessible text.
        let labels = page.query_all(Some(&item), "label").await?;
        let name_node = labels.get(1).or(labels.first());
        let step_name = match name_node {
            Some(label) => page.inner_text(label).await?,
            None => page.inner_text(&item).await?,
        };

        let automation_id = page.attribute(&item, "data-automation-id").await?;
        let aria_current = page.attribute(&item, "aria-current").await?;
        let is_current = automation_id.as_deref() == Some(dom::PROGRESS_ACTIVE)
            || matches!(aria_current.as_deref(), Some("step") | Some("true"));

        steps.push(StepDescriptor {
            step_name: step_name.trim().to_string(),
            is_current,
        });
    }
    Ok(steps)
}

pub fn current_step(steps: &[StepDescriptor]) -> Option<&StepDescriptor> {
    steps.iter().find(|step| step.is_current)
}

/// Snapshot every step with default options.
pub async fn extract_all_steps_sequentially<P: FormPage>(page: &P) -> FormSnapshot {
    extract_steps(page, &ExtractOptions::default()).await
}

/// Snapshot the wizard: the current step maps to its fields, every other
/// step to an empty list. Waits `options.timeouts.settle` first.
pub async fn extract_steps<P: FormPage>(page: &P, options: &ExtractOptions) -> FormSnapshot {
    tokio::time::sleep(options.timeouts.settle).await;

    let steps = read_progress(page).await;
    if steps.is_empty() {
        error!("progress indicator unavailable, nothing extracted");
        return FormSnapshot::new();
    }

    let mut snapshot = FormSnapshot::new();
    for step in &steps {
        info!(step = %step.step_name, current = step.is_current, "found step");
        if !step.is_current {
            snapshot.insert(step.step_name.clone(), Vec::new());
            continue;
        }

        let fields = extract_form_fields(page, options, true).await;
        if fields.is_empty() {
            error!(step = %step.step_name, "active step yielded no fields");
        } else {
            info!(step = %step.step_name, count = fields.len(), "extracted step fields");
        }
        snapshot.insert(step.step_name.clone(), fields);
    }
    snapshot
}
