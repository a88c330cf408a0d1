use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, PaginationSettings, Selectors};
use crate::driver::PageDriver;
use crate::error::DriverError;

/// Result of one attempt to reveal more reviews.
#[derive(Debug)]
pub enum LoadMore {
    MoreAvailable,
    /// The control is gone: every review is on the page.
    Exhausted,
    /// The control is still there but could not be activated.
    ActionFailed(DriverError),
}

/// Why expansion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    ActionFailed,
    RoundLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSummary {
    pub rounds: usize,
    pub stopped: StopReason,
}

/// Click "load more" once. A failed click is re-checked against the control's
/// presence so a vanished button reads as `Exhausted`.
pub async fn load_more<D: PageDriver>(page: &D, selectors: &Selectors) -> LoadMore {
    let controls = match page
        .find_by_role(&selectors.load_more_role, &selectors.load_more_label)
        .await
    {
        Ok(c) => c,
        Err(e) => return LoadMore::ActionFailed(e),
    };
    let Some(control) = controls.first() else {
        return LoadMore::Exhausted;
    };

    match page.click(control).await {
        Ok(()) => LoadMore::MoreAvailable,
        Err(e) => {
            let remaining = page
                .find_by_role(&selectors.load_more_role, &selectors.load_more_label)
                .await
                .map(|c| c.len())
                .unwrap_or(1);
            if remaining == 0 {
                debug!("Load-more control vanished after failed click: {}", e);
                LoadMore::Exhausted
            } else {
                LoadMore::ActionFailed(e)
            }
        }
    }
}

/// Keep loading until the control disappears, a click fails past the policy,
/// or the optional round cap is hit.
pub async fn expand_all<D: PageDriver>(
    page: &D,
    selectors: &Selectors,
    settings: &PaginationSettings,
) -> PaginationSummary {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] loading reviews: {pos} rounds")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let mut rounds = 0usize;
    let mut failures = 0u32;

    let stopped = loop {
        if settings.max_rounds.is_some_and(|max| rounds >= max) {
            break StopReason::RoundLimit;
        }

        match load_more(page, selectors).await {
            LoadMore::MoreAvailable => {
                rounds += 1;
                failures = 0;
                spinner.set_position(rounds as u64);
                info!(round = rounds, "Loaded more reviews");
            }
            LoadMore::Exhausted => break StopReason::Exhausted,
            LoadMore::ActionFailed(e) => {
                failures += 1;
                let retry = settings.on_failure == FailurePolicy::Retry
                    && failures <= settings.max_retries;
                if retry {
                    warn!(
                        "Load more failed (attempt {}/{}), retrying: {}",
                        failures, settings.max_retries, e
                    );
                    continue;
                }
                warn!(
                    "Load more failed with the control still present; stopping after {} rounds: {}",
                    rounds, e
                );
                break StopReason::ActionFailed;
            }
        }
    };

    spinner.finish_and_clear();
    PaginationSummary { rounds, stopped }
}
