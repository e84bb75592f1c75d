//! JSON run reports.
//!
//! Each run writes one file under a per-date directory:
//!
//! ```text
//! json_output_dir/
//! └── 2026-08-30/
//!     ├── 083000.json
//!     └── 151245.json
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::ClassifiedRecord;

/// Everything one scrape run produced.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    /// Source ids (or raw URLs) this run covered, in execution order.
    pub sources: Vec<String>,
    pub record_count: usize,
    pub records: Vec<ClassifiedRecord>,
}

impl RunReport {
    pub fn new(sources: Vec<String>, records: Vec<ClassifiedRecord>) -> Self {
        Self {
            generated_at: Utc::now(),
            record_count: records.len(),
            sources,
            records,
        }
    }
}

/// Write a run report to `{dir}/{date}/{HHMMSS}.json` and return the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_run_report(
    report: &RunReport,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let date_dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        report.generated_at.date_naive()
    );
    fs::create_dir_all(&date_dir).await?;

    let path = format!(
        "{}/{}.json",
        date_dir,
        report.generated_at.format("%H%M%S")
    );
    fs::write(&path, json).await?;
    info!(path = %path, records = report.record_count, "Wrote run report");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateRecord, Confidence};

    fn report() -> RunReport {
        RunReport::new(
            vec!["afdb".to_string()],
            vec![ClassifiedRecord {
                record: CandidateRecord {
                    url: "https://example.org/t/1".to_string(),
                    title: "Tender".to_string(),
                    content: "Tender details".to_string(),
                    raw_date: String::new(),
                    source_id: "afdb".to_string(),
                    confidence: Confidence::High,
                    fetched_at: Utc::now(),
                },
                classification: None,
            }],
        )
    }

    #[test]
    fn report_counts_records() {
        let report = report();
        assert_eq!(report.record_count, 1);
        assert_eq!(report.sources, vec!["afdb"]);
    }

    #[tokio::test]
    async fn writes_dated_report_file() {
        let dir = std::env::temp_dir().join(format!("sustain_scout_test_{}", std::process::id()));
        let dir_str = dir.to_str().unwrap().to_string();

        let path = write_run_report(&report(), &dir_str).await.unwrap();
        let written = fs::read_to_string(&path).await.unwrap();
        let parsed: RunReport = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.record_count, 1);
        assert_eq!(parsed.records[0].record.title, "Tender");

        let _ = fs::remove_dir_all(&dir).await;
    }
}
