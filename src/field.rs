//! Descriptors produced by an extraction pass.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `section_name` of fields that are not inside a dynamic section.
pub const MAIN_SECTION: &str = "main";

/// Label of a field whose caption could not be resolved.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// The interaction pattern of a form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Textarea,
    Checkbox,
    Radio,
    DropdownButton,
    MultiSelect,
    Date,
    SingleFile,
    MultipleFile,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::DropdownButton => "dropdown-button",
            FieldKind::MultiSelect => "multi-select",
            FieldKind::Date => "date",
            FieldKind::SingleFile => "single-file",
            FieldKind::MultipleFile => "multiple-file",
        }
    }

    pub fn is_file(self) -> bool {
        matches!(self, FieldKind::SingleFile | FieldKind::MultipleFile)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub label: String,
    pub input_id: String,
    pub required: bool,
    pub kind: FieldKind,
    pub options: Vec<String>,
    pub current_values: Vec<String>,
    pub section_name: String,
}

impl FieldDescriptor {
    /// Identity used to drop repeated detections of the same control.
    pub fn dedup_key(&self) -> String {
        format!("{}_{}", self.label, self.input_id)
    }

    pub fn is_unlabelled(&self) -> bool {
        self.label == UNKNOWN_LABEL
    }

    pub fn in_section(&self) -> bool {
        self.section_name != MAIN_SECTION
    }

    /// The 1-based section instance encoded in ids such as
    /// `workExperience-2--jobTitle`, or in the scope of a synthesized id
    /// such as `Work-Experience-2-panel/text-0`.
    pub fn instance(&self) -> Option<usize> {
        let head = match self.input_id.split_once('/') {
            Some((scope, _)) => scope.strip_suffix("-panel").unwrap_or(scope),
            None => self.input_id.split_once("--")?.0,
        };
        let (_, ordinal) = head.rsplit_once('-')?;
        ordinal.parse().ok()
    }

    /// The current value, typed by the field's kind.
    pub fn value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Checkbox => {
                FieldValue::Bool(self.current_values.first().is_some_and(|v| v == "Yes"))
            }
            FieldKind::Text | FieldKind::Textarea | FieldKind::Date => {
                FieldValue::Text(self.current_values.first().cloned().unwrap_or_default())
            }
            FieldKind::Radio | FieldKind::DropdownButton | FieldKind::MultiSelect => {
                FieldValue::Choice(self.current_values.clone())
            }
            FieldKind::SingleFile | FieldKind::MultipleFile => {
                FieldValue::Files(self.current_values.clone())
            }
        }
    }
}

/// A field's value with its shape fixed by the field kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Choice(Vec<String>),
    Bool(bool),
    Files(Vec<String>),
}

/// One entry of the wizard's progress indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub step_name: String,
    pub is_current: bool,
}

/// Fields per wizard step, in progress-indicator order.
///
/// Only the current step is server-rendered, so every other step maps to
/// an empty list. Serializes as a JSON object whose key order is the step
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    steps: Vec<(String, Vec<FieldDescriptor>)>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, replacing the fields of an existing step of the same
    /// name in place.
    pub fn insert(&mut self, step_name: impl Into<String>, fields: Vec<FieldDescriptor>) {
        let step_name = step_name.into();
        match self.steps.iter_mut().find(|(name, _)| *name == step_name) {
            Some(entry) => entry.1 = fields,
            None => self.steps.push((step_name, fields)),
        }
    }

    pub fn get(&self, step_name: &str) -> Option<&[FieldDescriptor]> {
        self.steps
            .iter()
            .find(|(name, _)| name == step_name)
            .map(|(_, fields)| fields.as_slice())
    }

    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldDescriptor])> {
        self.steps
            .iter()
            .map(|(name, fields)| (name.as_str(), fields.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Serialize for FormSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.steps.len()))?;
        for (name, fields) in &self.steps {
            map.serialize_entry(name, fields)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FormSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = FormSnapshot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of step names to field lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut snapshot = FormSnapshot::new();
                while let Some((name, fields)) = access.next_entry::<String, Vec<FieldDescriptor>>()? {
                    snapshot.insert(name, fields);
                }
                Ok(snapshot)
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}
