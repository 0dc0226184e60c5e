//! Getting from a job posting to the first page of the application wizard.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::answers::AnswerSet;
use crate::config::Timeouts;
use crate::dom::{self, attr_selector, find_by_text, FormPage, Navigator};
use crate::error::{Error, Result};
use crate::resolve::{all_texts, clean_label, non_empty_attribute};

const BUTTON: &str = r#"button, [role="button"]"#;
const SIGN_IN: &str = "Sign In";
const CREATE_ACCOUNT: &str = "Create Account";
const APPLY: &str = "Apply";
const APPLY_MANUALLY: &str = "Apply Manually";

const EMAIL_LABEL: &str = "Email Address";
const PASSWORD_LABEL: &str = "Password";
const VERIFY_PASSWORD_LABEL: &str = "Verify New Password";
const TERMS_CHECKBOX: &str = r#"[data-automation-id="createAccountCheckbox"]"#;

/// Open the posting, sign in (creating the account first if needed) and
/// enter the manual application.
pub async fn ensure_on_form<P: Navigator>(
    page: &P,
    answers: &AnswerSet,
    timeouts: &Timeouts,
) -> Result<()> {
    info!(url = %answers.job_url, "opening job posting");
    page.goto(&answers.job_url).await?;

    match wait_for_buttons(page, SIGN_IN, timeouts).await?.into_iter().next() {
        Some(button) => {
            info!("opening sign-in");
            page.click(&button).await?;
            tokio::time::sleep(timeouts.animation_wait).await;
        }
        None => warn!("no top-level Sign In button, assuming the sign-in form is shown"),
    }

    if labelled_input(page, EMAIL_LABEL, "email").await?.is_some()
        && labelled_input(page, VERIFY_PASSWORD_LABEL, "verifyPassword").await?.is_none()
    {
        sign_in(page, answers, timeouts).await?;
    } else if let Some(button) = find_by_text(page, None, BUTTON, CREATE_ACCOUNT).await? {
        info!("no sign-in form offered, creating account");
        page.click(&button).await?;
        tokio::time::sleep(timeouts.animation_wait).await;
        create_account(page, answers, timeouts).await?;
    } else {
        return Err(Error::LoginError("neither a sign-in form nor Create Account was offered".into()));
    }

    open_application(page, timeouts).await
}

async fn sign_in<P: Navigator>(page: &P, answers: &AnswerSet, timeouts: &Timeouts) -> Result<()> {
    info!(email = %answers.email, "signing in");
    fill_labelled(page, EMAIL_LABEL, "email", &answers.email).await?;
    fill_labelled(page, PASSWORD_LABEL, "password", &answers.password).await?;

    // The top-level Sign In button may still be on the page; the form's own
    // submit button comes last.
    let submit = wait_for_buttons(page, SIGN_IN, timeouts)
        .await?
        .pop()
        .ok_or_else(|| Error::ElementNotFound("Sign In submit button".into()))?;
    page.click(&submit).await?;
    tokio::time::sleep(timeouts.settle).await;

    let banners = all_texts(page, None, dom::ERROR_BANNER).await?;
    if !banners.is_empty() {
        if let Err(e) = page.screenshot_to_file(Path::new("login_failed.png")).await {
            debug!("could not capture login failure: {e}");
        }
        return Err(Error::LoginError(banners.join("; ")));
    }
    info!("signed in");
    Ok(())
}

async fn create_account<P: Navigator>(
    page: &P,
    answers: &AnswerSet,
    timeouts: &Timeouts,
) -> Result<()> {
    fill_labelled(page, EMAIL_LABEL, "email", &answers.email).await?;
    fill_labelled(page, PASSWORD_LABEL, "password", &answers.password).await?;
    fill_labelled(page, VERIFY_PASSWORD_LABEL, "verifyPassword", &answers.password).await?;

    match page.query_first(None, TERMS_CHECKBOX).await? {
        Some(terms) => {
            if !page.is_checked(&terms).await? {
                page.click(&terms).await?;
            }
        }
        None => warn!("terms checkbox not found"),
    }

    let submit = wait_for_buttons(page, CREATE_ACCOUNT, timeouts)
        .await?
        .pop()
        .ok_or_else(|| Error::ElementNotFound("Create Account submit button".into()))?;
    page.click(&submit).await?;
    info!("account submitted");
    tokio::time::sleep(timeouts.settle).await;

    let banners = all_texts(page, None, dom::ERROR_BANNER).await?;
    if !banners.is_empty() {
        return Err(Error::LoginError(banners.join("; ")));
    }

    // Workday returns to its sign-in form once the account exists.
    if let Some(button) = find_by_text(page, None, BUTTON, SIGN_IN).await? {
        page.click(&button).await?;
        tokio::time::sleep(timeouts.animation_wait).await;
    }
    sign_in(page, answers, timeouts).await
}

async fn open_application<P: FormPage>(page: &P, timeouts: &Timeouts) -> Result<()> {
    for caption in [APPLY, APPLY_MANUALLY] {
        match wait_for_buttons(page, caption, timeouts).await?.into_iter().next() {
            Some(button) => {
                info!(button = caption, "clicking");
                page.click(&button).await?;
                tokio::time::sleep(timeouts.animation_wait).await;
            }
            None => debug!(button = caption, "not offered"),
        }
    }
    Ok(())
}

/// Poll until at least one button with `caption` shows up. Returns every
/// match in document order, or an empty list on timeout.
async fn wait_for_buttons<P: FormPage>(
    page: &P,
    caption: &str,
    timeouts: &Timeouts,
) -> Result<Vec<P::Node>> {
    let start = Instant::now();
    loop {
        let mut found = Vec::new();
        for button in page.query_all(None, BUTTON).await? {
            if page.inner_text(&button).await?.trim().eq_ignore_ascii_case(caption) {
                found.push(button);
            }
        }
        if !found.is_empty() || start.elapsed() >= timeouts.element_wait {
            return Ok(found);
        }
        tokio::time::sleep(timeouts.poll_interval).await;
    }
}

/// The input captioned `label`, or the one carrying `automation_id`.
async fn labelled_input<P: FormPage>(
    page: &P,
    label: &str,
    automation_id: &str,
) -> Result<Option<P::Node>> {
    for candidate in page.query_all(None, "label[for]").await? {
        if clean_label(&page.inner_text(&candidate).await?) != label {
            continue;
        }
        if let Some(id) = non_empty_attribute(page, &candidate, "for").await? {
            if let Some(input) = page.query_first(None, &attr_selector("id", &id)).await? {
                return Ok(Some(input));
            }
        }
    }
    let selector = format!("input{}", attr_selector("data-automation-id", automation_id));
    page.query_first(None, &selector).await
}

async fn fill_labelled<P: FormPage>(
    page: &P,
    label: &str,
    automation_id: &str,
    value: &str,
) -> Result<()> {
    let input = labelled_input(page, label, automation_id)
        .await?
        .ok_or_else(|| Error::ElementNotFound(format!("{label} input")))?;
    page.fill(&input, value).await
}
