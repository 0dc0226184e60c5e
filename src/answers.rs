//! The applicant's answers, loaded from a YAML file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// One configured answer. Its shape is checked against the field kind it
/// is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAnswer")]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

/// YAML scalars as written; bare numbers such as postal codes become text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Bool(bool),
    Scalar(RawScalar),
    List(Vec<RawScalar>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<RawScalar> for String {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Int(n) => n.to_string(),
            RawScalar::Float(n) => n.to_string(),
            RawScalar::Bool(b) => b.to_string(),
            RawScalar::Text(t) => t,
        }
    }
}

impl From<RawAnswer> for AnswerValue {
    fn from(raw: RawAnswer) -> Self {
        match raw {
            RawAnswer::Bool(b) => AnswerValue::Bool(b),
            RawAnswer::Scalar(s) => AnswerValue::Text(s.into()),
            RawAnswer::List(items) => AnswerValue::List(items.into_iter().map(String::from).collect()),
        }
    }
}

impl AnswerValue {
    /// Truthiness for checkboxes. Text answers accept yes/true/1.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(b) => Some(*b),
            AnswerValue::Text(t) => match t.trim().to_lowercase().as_str() {
                "yes" | "true" | "1" => Some(true),
                "no" | "false" | "0" => Some(false),
                _ => None,
            },
            AnswerValue::List(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(t) => Some(t),
            _ => None,
        }
    }

    /// A list answer, or a single text answer promoted to a list.
    pub fn as_list(&self) -> Option<Vec<String>> {
        match self {
            AnswerValue::List(items) => Some(items.clone()),
            AnswerValue::Text(t) => Some(vec![t.clone()]),
            AnswerValue::Bool(_) => None,
        }
    }
}

/// Answers for one wizard step.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StepAnswers {
    /// Top-level fields, keyed by field label.
    pub answers: HashMap<String, AnswerValue>,
    /// Entries of dynamic sections, keyed by section title. Entry `n`
    /// fills the section's `n+1`-th instance.
    pub sections: HashMap<String, Vec<HashMap<String, AnswerValue>>>,
}

impl StepAnswers {
    pub fn main(&self, label: &str) -> Option<&AnswerValue> {
        self.answers.get(label)
    }

    /// The answer for `label` in the 1-based `instance` of `section`.
    pub fn section(&self, section: &str, instance: usize, label: &str) -> Option<&AnswerValue> {
        let entries = self.sections.get(section)?;
        entries.get(instance.checked_sub(1)?)?.get(label)
    }
}

/// The full answer set for one application run.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerSet {
    pub job_url: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Whether the review step's submit button may be pressed.
    #[serde(default)]
    pub submit: bool,
    #[serde(default)]
    pub steps: HashMap<String, StepAnswers>,
}

fn default_headless() -> bool {
    true
}

impl AnswerSet {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))
    }

    pub fn step(&self, step_name: &str) -> Option<&StepAnswers> {
        self.steps.get(step_name)
    }

    /// Number of section instances to materialize per section of a step.
    pub fn section_plan(&self, step_name: &str) -> HashMap<String, usize> {
        self.step(step_name)
            .map(|step| {
                step.sections
                    .iter()
                    .map(|(title, entries)| (title.clone(), entries.len()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
job_url: https://example.wd5.myworkdayjobs.com/en-US/careers/job/apply
email: ada@example.com
password: hunter2
steps:
  My Information:
    answers:
      First Name: Ada
      Postal Code: 94105
      How Did You Hear About Us?: [Referral, LinkedIn]
      I have a preferred name: false
  My Experience:
    sections:
      Work Experience:
        - Job Title: Engineer
          I currently work here: true
        - Job Title: Analyst
"#;

    #[test]
    fn parses_typed_answers() {
        let set = AnswerSet::from_yaml(SAMPLE).unwrap();
        assert!(set.headless);
        assert!(!set.submit);

        let info = set.step("My Information").unwrap();
        assert_eq!(info.main("First Name"), Some(&AnswerValue::Text("Ada".into())));
        assert_eq!(info.main("Postal Code").and_then(AnswerValue::as_text), Some("94105"));
        assert_eq!(
            info.main("How Did You Hear About Us?"),
            Some(&AnswerValue::List(vec!["Referral".into(), "LinkedIn".into()]))
        );
        assert_eq!(info.main("I have a preferred name").and_then(AnswerValue::as_bool), Some(false));
    }

    #[test]
    fn section_entries_are_one_based() {
        let set = AnswerSet::from_yaml(SAMPLE).unwrap();
        let exp = set.step("My Experience").unwrap();
        assert_eq!(
            exp.section("Work Experience", 2, "Job Title"),
            Some(&AnswerValue::Text("Analyst".into()))
        );
        assert_eq!(exp.section("Work Experience", 0, "Job Title"), None);
        assert_eq!(exp.section("Work Experience", 3, "Job Title"), None);
        assert_eq!(set.section_plan("My Experience").get("Work Experience"), Some(&2));
        assert!(set.section_plan("Review").is_empty());
    }

    #[test]
    fn text_truthiness() {
        assert_eq!(AnswerValue::Text("Yes".into()).as_bool(), Some(true));
        assert_eq!(AnswerValue::Text("maybe".into()).as_bool(), None);
        assert_eq!(AnswerValue::List(vec![]).as_bool(), None);
    }

    #[test]
    fn missing_credentials_are_a_config_error() {
        let err = AnswerSet::from_yaml("job_url: x").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
