//! Driving the wizard from its current step through review.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::answers::{AnswerSet, StepAnswers};
use crate::config::{ExtractOptions, Timeouts};
use crate::dom::{self, Navigator};
use crate::error::{Error, Result};
use crate::fill::{fill_fields, FillReport};
use crate::resolve::all_texts;
use crate::steps::{current_step, extract_steps, read_progress};

/// Upper bound on wizard pages visited in one run.
pub const DEFAULT_MAX_PAGES: usize = 10;

/// What happened on one visited step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step_name: String,
    pub report: FillReport,
}

/// One application run over the wizard.
pub struct Application<'a> {
    answers: &'a AnswerSet,
    timeouts: Timeouts,
    max_pages: usize,
    screenshot_dir: PathBuf,
}

impl<'a> Application<'a> {
    pub fn new(answers: &'a AnswerSet, timeouts: Timeouts) -> Self {
        Self {
            answers,
            timeouts,
            max_pages: DEFAULT_MAX_PAGES,
            screenshot_dir: PathBuf::from("."),
        }
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Where `<step>_failed.png` captures are written.
    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Fill and advance step by step until the review step is reached.
    ///
    /// The review step's footer button submits the application and is only
    /// pressed when the answer set allows it.
    pub async fn run<P: Navigator>(&self, page: &P) -> Result<Vec<StepRecord>> {
        let empty = StepAnswers::default();
        let mut records = Vec::new();

        for _ in 0..self.max_pages {
            let steps = read_progress(page).await;
            let Some(position) = steps.iter().position(|s| s.is_current) else {
                return Err(self.fail(page, "unknown", "no active step in the progress bar").await);
            };
            let step_name = steps[position].step_name.clone();
            let is_review = position + 1 == steps.len() || step_name.contains("Review");
            info!(step = %step_name, "--- starting step ---");

            let options = ExtractOptions::new(self.timeouts.clone())
                .with_section_instances(self.answers.section_plan(&step_name));
            let snapshot = extract_steps(page, &options).await;
            let fields = snapshot.get(&step_name).unwrap_or_default();

            let answers = self.answers.step(&step_name).unwrap_or(&empty);
            let report = fill_fields(page, fields, answers, &self.timeouts).await;
            info!(
                step = %step_name,
                filled = report.filled,
                skipped = report.skipped,
                failed = report.failed,
                "step filled"
            );
            if report.failed > 0 {
                warn!(step = %step_name, "{} field(s) could not be filled", report.failed);
            }
            records.push(StepRecord {
                step_name: step_name.clone(),
                report,
            });

            if is_review && !self.answers.submit {
                info!("submission disabled, stopping at review");
                return Ok(records);
            }

            let Some(next) = page.query_first(None, dom::NEXT_BUTTON).await? else {
                return Err(self.fail(page, &step_name, "footer button not found").await);
            };
            page.click(&next).await?;
            tokio::time::sleep(self.timeouts.settle).await;

            let banners = all_texts(page, None, dom::ERROR_BANNER).await?;
            if !banners.is_empty() {
                return Err(self.fail(page, &step_name, &banners.join("; ")).await);
            }
            if is_review {
                info!("application submitted");
                return Ok(records);
            }

            let after = read_progress(page).await;
            if current_step(&after).is_some_and(|s| s.step_name == step_name) {
                return Err(self.fail(page, &step_name, "step did not advance").await);
            }
            info!(step = %step_name, "--- completed step ---");
        }

        warn!(max_pages = self.max_pages, "page limit reached before review");
        Ok(records)
    }

    /// Capture the page and build the error that stops the run.
    async fn fail<P: Navigator>(&self, page: &P, step_name: &str, reason: &str) -> Error {
        error!(step = %step_name, "step failed: {reason}");
        let path = self.screenshot_dir.join(failure_capture_name(step_name));
        if let Err(e) = page.screenshot_to_file(&path).await {
            warn!(path = %path.display(), "could not capture failed step: {e}");
        }
        Error::StepError(format!("{step_name}: {reason}"))
    }
}

/// `My Information` becomes `my_information_failed.png`.
pub fn failure_capture_name(step_name: &str) -> PathBuf {
    let stem: String = step_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    PathBuf::from(format!("{stem}_failed.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_names_are_filesystem_safe() {
        assert_eq!(failure_capture_name("My Information"), PathBuf::from("my_information_failed.png"));
        assert_eq!(
            failure_capture_name("Review / Submit"),
            PathBuf::from("review___submit_failed.png")
        );
    }
}
