//! Writing configured answers back into extracted fields.
//!
//! Filling works from the descriptors of one extraction pass: each field is
//! relocated by its `input_id` and driven with the interaction its kind
//! calls for. A field without an answer is left alone, and so is one whose
//! id was synthesized, since nothing on the page carries it.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::answers::{AnswerValue, StepAnswers};
use crate::config::Timeouts;
use crate::dom::{self, attr_selector, FormPage};
use crate::error::{Error, Result};
use crate::extract::{is_synthetic_id, radio_caption, with_open_popup, Dismiss};
use crate::field::{FieldDescriptor, FieldKind, FieldValue};

/// Tally of one fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Outcome {
    Filled,
    /// The answer's shape does not fit the field kind.
    Mismatch,
}

/// Fill every field of `fields` that has an answer in `answers`.
///
/// Per-field failures are logged and counted; they never abort the pass.
pub async fn fill_fields<P: FormPage>(
    page: &P,
    fields: &[FieldDescriptor],
    answers: &StepAnswers,
    timeouts: &Timeouts,
) -> FillReport {
    let mut report = FillReport::default();
    for field in fields {
        if field.is_unlabelled() {
            debug!(field = %field.input_id, "skipping unlabelled field");
            report.skipped += 1;
            continue;
        }
        let Some(answer) = answer_for(field, answers) else {
            debug!(label = %field.label, section = %field.section_name, "no answer configured");
            report.skipped += 1;
            continue;
        };
        if is_synthetic_id(&field.input_id) {
            debug!(label = %field.label, field = %field.input_id, "no page id to locate the field by");
            report.skipped += 1;
            continue;
        }

        match fill_field(page, field, answer, timeouts).await {
            Ok(Outcome::Filled) => {
                info!(label = %field.label, kind = %field.kind, "filled");
                report.filled += 1;
            }
            Ok(Outcome::Mismatch) => {
                warn!(label = %field.label, kind = %field.kind, ?answer, "answer does not fit field kind");
                report.skipped += 1;
            }
            Err(e) => {
                warn!(label = %field.label, field = %field.input_id, "fill failed: {e}");
                report.failed += 1;
            }
        }
    }
    report
}

/// Section fields are answered by the entry matching their instance.
fn answer_for<'a>(field: &FieldDescriptor, answers: &'a StepAnswers) -> Option<&'a AnswerValue> {
    if field.in_section() {
        answers.section(&field.section_name, field.instance().unwrap_or(1), &field.label)
    } else {
        answers.main(&field.label)
    }
}

async fn fill_field<P: FormPage>(
    page: &P,
    field: &FieldDescriptor,
    answer: &AnswerValue,
    timeouts: &Timeouts,
) -> Result<Outcome> {
    let node = locate(page, &field.input_id).await?;
    match field.kind {
        FieldKind::Text | FieldKind::Textarea => {
            let Some(text) = answer.as_text() else {
                return Ok(Outcome::Mismatch);
            };
            if field.value() != FieldValue::Text(text.to_string()) {
                page.fill(&node, text).await?;
            }
        }
        FieldKind::Checkbox => {
            let Some(want) = answer.as_bool() else {
                return Ok(Outcome::Mismatch);
            };
            if page.is_checked(&node).await? != want {
                page.click(&node).await?;
            }
        }
        FieldKind::Radio => {
            let Some(choice) = answer.as_text() else {
                return Ok(Outcome::Mismatch);
            };
            choose_radio(page, &node, choice).await?;
        }
        FieldKind::DropdownButton => {
            let Some(choice) = answer.as_text() else {
                return Ok(Outcome::Mismatch);
            };
            with_open_popup(page, &node, Dismiss::Escape, || {
                pick_option(page, dom::LISTBOX_OPTION, choice, timeouts)
            })
            .await?;
        }
        FieldKind::MultiSelect => {
            let Some(choices) = answer.as_list() else {
                return Ok(Outcome::Mismatch);
            };
            let selected = match field.value() {
                FieldValue::Choice(selected) => selected,
                _ => Vec::new(),
            };
            let pending: Vec<&String> = choices
                .iter()
                .filter(|c| !selected.iter().any(|v| v.eq_ignore_ascii_case(c)))
                .collect();
            if pending.is_empty() {
                return Ok(Outcome::Filled);
            }
            let input = page.query_first(Some(&node), "input").await?;
            let trigger = input.unwrap_or(node);
            with_open_popup(page, &trigger, Dismiss::Escape, || async {
                for choice in pending {
                    pick_option(page, dom::CHOICE_OPTION, choice, timeouts).await?;
                }
                Ok(())
            })
            .await?;
        }
        FieldKind::Date => {
            let Some(date) = answer.as_text() else {
                return Ok(Outcome::Mismatch);
            };
            if field.value() != FieldValue::Text(date.to_string()) {
                fill_date(page, &node, date).await?;
            }
        }
        FieldKind::SingleFile | FieldKind::MultipleFile => {
            let Some(paths) = answer.as_list() else {
                return Ok(Outcome::Mismatch);
            };
            if field.kind == FieldKind::SingleFile && paths.len() > 1 {
                return Ok(Outcome::Mismatch);
            }
            let is_input = page.attribute(&node, "type").await?.as_deref() == Some("file");
            let input = if is_input {
                node
            } else {
                page.query_first(Some(&node), dom::FILE_INPUT)
                    .await?
                    .ok_or_else(|| Error::ElementNotFound(format!("file input for {}", field.input_id)))?
            };
            let files: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
            page.set_input_files(&input, &files).await?;
        }
    }
    Ok(Outcome::Filled)
}

async fn locate<P: FormPage>(page: &P, input_id: &str) -> Result<P::Node> {
    page.query_first(None, &attr_selector("id", input_id))
        .await?
        .ok_or_else(|| Error::ElementNotFound(input_id.to_string()))
}

async fn choose_radio<P: FormPage>(page: &P, group: &P::Node, choice: &str) -> Result<()> {
    for radio in page.query_all(Some(group), dom::RADIO_INPUT).await? {
        if radio_caption(page, &radio).await?.eq_ignore_ascii_case(choice) {
            return page.click(&radio).await;
        }
    }
    Err(Error::ElementNotFound(format!("radio option {choice:?}")))
}

/// Click the option matching `choice` exactly (ignoring case), or failing
/// that the first option containing its first word.
async fn pick_option<P: FormPage>(
    page: &P,
    selector: &str,
    choice: &str,
    timeouts: &Timeouts,
) -> Result<()> {
    tokio::time::sleep(timeouts.animation_wait).await;
    let options = page
        .wait_for_count(None, selector, 1, timeouts.element_wait, timeouts.poll_interval)
        .await?;
    let captions = all_captions(page, &options).await?;
    let index = best_match(&captions, choice)
        .ok_or_else(|| Error::ElementNotFound(format!("option {choice:?} among {captions:?}")))?;
    page.click(&options[index]).await
}

async fn all_captions<P: FormPage>(page: &P, options: &[P::Node]) -> Result<Vec<String>> {
    let mut captions = Vec::with_capacity(options.len());
    for option in options {
        captions.push(page.inner_text(option).await?.trim().to_string());
    }
    Ok(captions)
}

/// Index of the caption that best matches `choice`.
pub fn best_match(captions: &[String], choice: &str) -> Option<usize> {
    let choice = choice.trim();
    if let Some(exact) = captions.iter().position(|c| c.eq_ignore_ascii_case(choice)) {
        return Some(exact);
    }
    let first_word = choice.split_whitespace().next()?.to_lowercase();
    captions
        .iter()
        .position(|c| c.to_lowercase().contains(&first_word))
}

/// Type each `/`-separated part into the matching date sub-input.
async fn fill_date<P: FormPage>(page: &P, wrapper: &P::Node, date: &str) -> Result<()> {
    let mut inputs = Vec::new();
    for selector in [dom::DATE_MONTH, dom::DATE_DAY, dom::DATE_YEAR] {
        if let Some(input) = page.query_first(Some(wrapper), selector).await? {
            inputs.push(input);
        }
    }
    let parts: Vec<&str> = date.split('/').map(str::trim).collect();
    if inputs.is_empty() || parts.len() != inputs.len() {
        return Err(Error::ElementNotFound(format!(
            "{} date input(s) for {date:?}",
            parts.len()
        )));
    }
    for (input, part) in inputs.iter().zip(parts) {
        page.fill(input, part).await?;
    }
    Ok(())
}
