//! Report writer: exports completed pipeline runs as JSON and rolls batches
//! up into summary tables (JSON and CSV).

use std::fs;
use std::path::{Path, PathBuf};

use campaign_agents::{PipelineOutcome, PipelineResult};
use campaign_core::error::CampaignResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

// ─── Types ──────────────────────────────────────────────────────────────────

/// One line of a batch summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub timestamp: DateTime<Utc>,
    pub customer: String,
    pub sector: String,
    pub segment: String,
    pub confidence: f64,
    pub campaign: String,
    pub channel: String,
    pub discount: String,
    pub open_rate: String,
    pub click_through_rate: String,
    pub conversion_rate: String,
    pub enhanced: bool,
}

impl From<&PipelineResult> for SummaryRow {
    fn from(result: &PipelineResult) -> Self {
        let payload = &result.campaign.payload;
        Self {
            timestamp: result.metadata.timestamp,
            customer: result.customer.name.clone(),
            sector: result
                .customer
                .sector
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            segment: result.segmentation.result.segment.as_str().to_string(),
            confidence: result.segmentation.result.confidence,
            campaign: payload.name.clone(),
            channel: payload.channel.as_str().to_string(),
            discount: format!("{:.0}%", payload.discount * 100.0),
            open_rate: payload.metrics.open_rate.clone(),
            click_through_rate: payload.metrics.click_through_rate.clone(),
            conversion_rate: payload.metrics.conversion_rate.clone(),
            enhanced: payload.was_enhanced(),
        }
    }
}

/// Failed runs are counted but contribute no rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub rows: Vec<SummaryRow>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[PipelineOutcome]) -> Self {
        let rows: Vec<SummaryRow> = outcomes
            .iter()
            .filter_map(PipelineOutcome::result)
            .map(SummaryRow::from)
            .collect();

        Self {
            total: outcomes.len(),
            completed: rows.len(),
            failed: outcomes.len() - rows.len(),
            rows,
        }
    }

    pub const CSV_COLUMNS: [&'static str; 12] = [
        "timestamp",
        "customer",
        "sector",
        "segment",
        "confidence",
        "campaign",
        "channel",
        "discount",
        "open_rate",
        "click_through_rate",
        "conversion_rate",
        "enhanced",
    ];

    pub fn to_csv(&self) -> String {
        let mut csv = Self::CSV_COLUMNS.join(",");
        csv.push('\n');
        for row in &self.rows {
            let cells = [
                quote(&row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                quote(&row.customer),
                quote(&row.sector),
                quote(&row.segment),
                format!("{:.2}", row.confidence),
                quote(&row.campaign),
                quote(&row.channel),
                quote(&row.discount),
                quote(&row.open_rate),
                quote(&row.click_through_rate),
                quote(&row.conversion_rate),
                row.enhanced.to_string(),
            ];
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// `campaign_<Name_With_Underscores>_<YYYYmmdd_HHMMSS>.json`
pub fn run_file_name(customer_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "campaign_{}_{}.json",
        customer_name.replace(' ', "_"),
        at.format("%Y%m%d_%H%M%S")
    )
}

// ─── Writer ─────────────────────────────────────────────────────────────────

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> CampaignResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    /// Pretty JSON of one completed run.
    pub fn write_run(&self, result: &PipelineResult) -> CampaignResult<PathBuf> {
        let name = run_file_name(&result.metadata.customer_name, result.metadata.timestamp);
        let path = self.write_json(&name, result)?;
        info!(path = %path.display(), customer = %result.metadata.customer_name, "Run exported");
        Ok(path)
    }

    pub fn write_summary(&self, summary: &BatchSummary) -> CampaignResult<PathBuf> {
        let path = self.write_json("summary.json", summary)?;
        info!(
            path = %path.display(),
            completed = summary.completed,
            failed = summary.failed,
            "Batch summary exported"
        );
        Ok(path)
    }

    pub fn write_summary_csv(&self, summary: &BatchSummary) -> CampaignResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join("results.csv");
        fs::write(&path, summary.to_csv())?;
        info!(path = %path.display(), rows = summary.rows.len(), "Batch CSV exported");
        Ok(path)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_agents::PipelineOrchestrator;
    use campaign_cdp::{CustomerDirectory, MockSocialProvider};
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::time::Duration;

    fn orchestrator() -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            Arc::new(CustomerDirectory::demo()),
            Arc::new(MockSocialProvider::demo(Duration::ZERO)),
        )
    }

    #[test]
    fn test_run_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            run_file_name("Empresa Tech SAC", at),
            "campaign_Empresa_Tech_SAC_20240309_140507.json"
        );
    }

    #[tokio::test]
    async fn test_write_run_creates_readable_json() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(tmp.path().join("out"));

        let outcome = orchestrator().run("Laura Vega").await;
        let path = writer.write_run(outcome.result().unwrap()).unwrap();

        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("campaign_Laura_Vega_"));
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["segmentation"]["segment"], "VIP_HIGH_VALUE");
        assert_eq!(value["campaign"]["applied_discount"], value["campaign"]["discount"]);
    }

    #[tokio::test]
    async fn test_batch_summary_counts_failures() {
        let orchestrator = orchestrator();
        let mut outcomes = orchestrator.run_batch().await;
        outcomes.push(orchestrator.run("Nadie").await);

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total, 9);
        assert_eq!(summary.completed, 8);
        assert_eq!(summary.failed, 1);

        let juan = summary.rows.iter().find(|r| r.customer == "Juan Perez").unwrap();
        assert_eq!(juan.segment, "CHURN_RISK");
        assert_eq!(juan.channel, "sms");
        assert_eq!(juan.open_rate, "98.0%");
    }

    #[tokio::test]
    async fn test_summary_exports() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(tmp.path());
        let summary = BatchSummary::from_outcomes(&orchestrator().run_batch().await);

        let json_path = writer.write_summary(&summary).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(parsed["rows"].as_array().unwrap().len(), 8);

        let csv_path = writer.write_summary_csv(&summary).unwrap();
        let csv = fs::read_to_string(csv_path).unwrap();
        assert!(csv.starts_with("timestamp,customer,"));
        assert_eq!(csv.lines().count(), 9); // header + 8 customers
        assert!(csv.contains("\"Empresa Tech SAC\""));
    }

    #[test]
    fn test_csv_quotes_embedded_quotes() {
        assert_eq!(quote("Dicho \"así\""), "\"Dicho \"\"así\"\"\"");
    }
}
