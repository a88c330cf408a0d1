use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ExportError;
use crate::review::ReviewRecord;

pub const JSON_FILE: &str = "reviews.json";
pub const CSV_FILE: &str = "reviews.csv";
pub const MARKDOWN_FILE: &str = "reviews.md";
pub const REPORT_FILE: &str = "report.md";

const CSV_HEADER: &str = "Name,Rate,Date,Content";

#[derive(Debug)]
pub struct Written {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub markdown: PathBuf,
}

pub fn to_json(records: &[ReviewRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Only `content` is quoted. Commas or newlines in the other columns pass
/// through untouched, which older consumers of this file rely on.
pub fn to_csv(records: &[ReviewRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in records {
        out.push_str(&format!(
            "{},{},{},\"{}\"\n",
            r.name,
            r.rate.as_deref().unwrap_or(""),
            r.created_at,
            r.content.replace('"', "\"\"")
        ));
    }
    out
}

pub fn to_markdown(records: &[ReviewRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "Name:{}\nRate:{}\nDate:{}\nContent:{}\n",
                r.name,
                r.rate.as_deref().unwrap_or(""),
                r.created_at,
                r.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write all three formats into `dir`. Each is attempted even if an earlier
/// one fails; failures are returned together afterwards.
pub fn write_all(records: &[ReviewRecord], dir: &Path) -> Result<Written, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let written = Written {
        json: dir.join(JSON_FILE),
        csv: dir.join(CSV_FILE),
        markdown: dir.join(MARKDOWN_FILE),
    };

    let results = [
        to_json(records).and_then(|body| write_file(&written.json, &body)),
        write_file(&written.csv, &to_csv(records)),
        write_file(&written.markdown, &to_markdown(records)),
    ];

    let errors: Vec<ExportError> = results.into_iter().filter_map(Result::err).collect();
    if !errors.is_empty() {
        for e in &errors {
            warn!("Export failed: {}", e);
        }
        return Err(ExportError::Partial(errors));
    }

    info!(dir = %dir.display(), count = records.len(), "Exports written");
    Ok(written)
}

pub fn write_file(path: &Path, body: &str) -> Result<(), ExportError> {
    fs::write(path, body).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
