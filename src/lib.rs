pub mod aggregate;
pub mod answers;
pub mod apply;
pub mod browser;
pub mod config;
pub mod dom;
pub mod element;
pub mod error;
pub mod extract;
pub mod field;
pub mod fill;
pub mod login;
pub mod page;
pub mod resolve;
pub mod sections;
pub mod steps;

pub use aggregate::{extract_all_form_fields, extract_form_fields, FieldSet};
pub use answers::{AnswerSet, AnswerValue, StepAnswers};
pub use apply::{Application, StepRecord};
pub use browser::ApplicantBrowser;
pub use config::{BrowserBuilder, BrowserConfig, ExtractOptions, Timeouts};
pub use dom::{FormPage, Navigator};
pub use error::{Error, Result};
pub use field::{FieldDescriptor, FieldKind, FieldValue, FormSnapshot, StepDescriptor};
pub use fill::{fill_fields, FillReport};
pub use login::ensure_on_form;
pub use page::Page;
pub use sections::extract_section_fields;
pub use steps::{extract_all_steps_sequentially, extract_steps, read_progress};
