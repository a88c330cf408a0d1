pub mod date;
pub mod fields;
pub mod paginate;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::Selectors;
use crate::driver::PageDriver;
use crate::error::{DriverError, ExtractionError};
use crate::review::ReviewRecord;

pub struct Harvest {
    /// In page order.
    pub records: Vec<ReviewRecord>,
    pub containers: usize,
    pub failed: usize,
}

/// Extract every review container on the (already expanded) page.
///
/// A container that fails is logged and skipped; it never aborts the batch.
pub async fn harvest<D: PageDriver>(
    page: &D,
    selectors: &Selectors,
) -> Result<Harvest, DriverError> {
    let containers = page.query_all(&selectors.container).await?;
    info!("Found {} review containers", containers.len());

    let pb = ProgressBar::new(containers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} reviews")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut records = Vec::with_capacity(containers.len());
    let mut failed = 0usize;

    for (idx, container) in containers.iter().enumerate() {
        match harvest_one(page, container, selectors).await {
            Ok(record) => records.push(record),
            Err(e) => {
                failed += 1;
                warn!(container = idx, "Skipping review: {}", e);
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(Harvest {
        records,
        containers: containers.len(),
        failed,
    })
}

async fn harvest_one<D: PageDriver>(
    page: &D,
    container: &D::Element,
    selectors: &Selectors,
) -> Result<ReviewRecord, ExtractionError> {
    let raw = fields::extract(page, container, selectors).await?;
    let created_at = date::normalize(&raw.date)?;
    Ok(raw.into_record(created_at))
}
