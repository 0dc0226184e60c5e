mod common;

use std::path::PathBuf;

use common::{page, progress_bar, text_field, FakePage, Reaction};
use pretty_assertions::assert_eq;
use workday_autofill::{AnswerSet, Application, Error, Timeouts};

const STEPS: [&str; 2] = ["My Information", "Review"];

fn answers(submit: bool) -> AnswerSet {
    AnswerSet::from_yaml(&format!(
        r#"
job_url: https://example.test/job
email: ada@example.com
password: pw
submit: {submit}
steps:
  My Information:
    answers:
      First Name: Ada
"#
    ))
    .expect("answers parse")
}

fn information_step() -> String {
    page(&format!(
        r#"{}{}<button data-automation-id="pageFooterNextButton" id="next">Save and Continue</button>"#,
        progress_bar(&STEPS, 0),
        text_field("legalName", "name--legalName--firstName", "First Name*", ""),
    ))
}

fn review_step() -> String {
    page(&format!(
        r#"{}<p>Review your application</p><button data-automation-id="pageFooterNextButton" id="submit">Submit</button><!--slot:done-->"#,
        progress_bar(&STEPS, 1),
    ))
}

#[tokio::test]
async fn stops_at_review_when_submission_is_disabled() {
    let fake = FakePage::new(information_step()).on_click("next", Reaction::Replace(review_step()));
    let set = answers(false);

    let records = Application::new(&set, Timeouts::immediate())
        .run(&fake)
        .await
        .expect("run completes");

    let names: Vec<&str> = records.iter().map(|r| r.step_name.as_str()).collect();
    assert_eq!(names, vec!["My Information", "Review"]);
    assert_eq!(records[0].report.filled, 1);
    assert_eq!(fake.clicks(), vec!["next"]);
}

#[tokio::test]
async fn review_is_submitted_when_allowed() {
    let fake = FakePage::new(information_step())
        .on_click("next", Reaction::Replace(review_step()))
        .on_click(
            "submit",
            Reaction::Insert {
                slot: "done".into(),
                html: "<p>Application submitted</p>".into(),
            },
        );
    let set = answers(true);

    let records = Application::new(&set, Timeouts::immediate())
        .run(&fake)
        .await
        .expect("run completes");

    assert_eq!(records.len(), 2);
    assert_eq!(fake.clicks(), vec!["next", "submit"]);
}

#[tokio::test]
async fn step_that_does_not_advance_fails_with_a_capture() {
    let fake = FakePage::new(information_step());
    let set = answers(false);
    let dir = tempfile::tempdir().expect("temp dir");

    let err = Application::new(&set, Timeouts::immediate())
        .screenshot_dir(dir.path())
        .run(&fake)
        .await
        .expect_err("page never advances");

    assert!(matches!(err, Error::StepError(ref m) if m.contains("My Information")), "{err}");
    assert_eq!(
        fake.screenshots(),
        vec![dir.path().join(PathBuf::from("my_information_failed.png"))]
    );
}

#[tokio::test]
async fn validation_banner_fails_the_step() {
    let html = information_step().replace("</body>", "<!--slot:errors--></body>");
    let fake = FakePage::new(html).on_click(
        "next",
        Reaction::Insert {
            slot: "errors".into(),
            html: r#"<div data-automation-id="errorBanner">First Name is required</div>"#.into(),
        },
    );
    let set = answers(false);

    let err = Application::new(&set, Timeouts::immediate())
        .run(&fake)
        .await
        .expect_err("validation error stops the run");
    assert!(err.to_string().contains("First Name is required"), "{err}");
}
