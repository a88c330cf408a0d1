use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Settings;
use crate::driver::PageDriver;
use crate::export::{self, Written};
use crate::harvest::paginate::{self, PaginationSummary};
use crate::harvest::{self, Harvest};
use crate::insight::{prompt, DocumentAnalyzer, InsightPipeline};

pub struct RunSummary {
    pub pagination: PaginationSummary,
    pub harvest: Harvest,
    pub written: Written,
}

/// Open `url`, expand every review, extract them and write the three exports.
pub async fn run<D: PageDriver>(page: &D, url: &str, settings: &Settings) -> Result<RunSummary> {
    page.goto(url)
        .await
        .with_context(|| format!("Failed to open {}", url))?;
    info!("Opened {}", url);

    let pagination =
        paginate::expand_all(page, &settings.selectors, &settings.pagination).await;
    println!(
        "Expanded reviews: {} load-more rounds ({:?})",
        pagination.rounds, pagination.stopped
    );

    let harvest = harvest::harvest(page, &settings.selectors)
        .await
        .context("Failed to list review containers")?;
    println!(
        "Harvested {} of {} containers ({} skipped)",
        harvest.records.len(),
        harvest.containers,
        harvest.failed
    );

    let written = export::write_all(&harvest.records, &settings.output.dir)
        .context("Failed to write exports")?;
    println!("Wrote {}", settings.output.dir.display());

    Ok(RunSummary {
        pagination,
        harvest,
        written,
    })
}

/// Run the insight report when an analyzer is given, then report timing and
/// the harvested count. The count is always the last line, even when the
/// insight step fails; that failure is returned afterwards.
pub async fn finish<A: DocumentAnalyzer, W: Write>(
    summary: &RunSummary,
    analyzer: Option<A>,
    settings: &Settings,
    started: Instant,
    out: &mut W,
) -> Result<()> {
    let insight = match analyzer {
        Some(analyzer) => Some(write_insight(analyzer, summary, settings, out).await),
        None => None,
    };

    let elapsed = started.elapsed();
    if elapsed.as_secs() >= 1 {
        writeln!(out, "Done in {}", format_duration(elapsed))?;
    }
    info!(
        rounds = summary.pagination.rounds,
        stopped = ?summary.pagination.stopped,
        "Scrape finished"
    );
    writeln!(out, "Harvested {} reviews", summary.harvest.records.len())?;

    insight.transpose()?;
    Ok(())
}

async fn write_insight<A: DocumentAnalyzer, W: Write>(
    analyzer: A,
    summary: &RunSummary,
    settings: &Settings,
    out: &mut W,
) -> Result<PathBuf> {
    writeln!(out, "Generating insight report...")?;
    let report = InsightPipeline::new(analyzer, prompt::REVIEW_ANALYSIS_BRIEF, &settings.insight)
        .summarize(&summary.written.json)
        .await
        .context("Insight report failed")?;
    let path = settings.output.dir.join(export::REPORT_FILE);
    export::write_file(&path, &report)?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(path)
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
