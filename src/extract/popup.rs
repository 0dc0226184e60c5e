use std::future::Future;

use tracing::warn;

use crate::config::Timeouts;
use crate::dom::FormPage;
use crate::error::Result;
use crate::resolve::all_texts;

/// How an opened popup is closed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismiss {
    /// Send the Escape key.
    Escape,
    /// Click the trigger a second time.
    Toggle,
}

/// Open the popup behind `trigger`, run `read`, and close the popup again
/// whether or not `read` succeeded.
///
/// The popup is closed before the result is returned, so a failing read
/// never leaves an overlay covering the containers that follow.
pub async fn with_open_popup<P, T, F, Fut>(
    page: &P,
    trigger: &P::Node,
    dismiss: Dismiss,
    read: F,
) -> Result<T>
where
    P: FormPage,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    page.click(trigger).await?;
    let result = read().await;

    let closed = match dismiss {
        Dismiss::Escape => page.press_key("Escape").await,
        Dismiss::Toggle => match page.click(trigger).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("closing popup by its trigger failed, sending Escape: {e}");
                page.press_key("Escape").await
            }
        },
    };

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                warn!("popup left open after failed read: {close_err}");
            }
            Err(e)
        }
    }
}

/// Wait for the option list of an opened popup and read its captions.
pub(super) async fn read_options<P: FormPage>(
    page: &P,
    selector: &str,
    timeouts: &Timeouts,
) -> Result<Vec<String>> {
    tokio::time::sleep(timeouts.animation_wait).await;
    page.wait_for_count(None, selector, 1, timeouts.element_wait, timeouts.poll_interval)
        .await?;
    all_texts(page, None, selector).await
}
