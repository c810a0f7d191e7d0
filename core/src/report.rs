//! Batch results, summary statistics, and the flat-file outputs built
//! from them (text daily report, timestamped JSON report, CSV export).

use crate::{
    error::MonitorResult,
    scorer::{RiskLevel, RiskSignal},
    types::{CustomerId, RunId, SourceKind},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ── Public types ─────────────────────────────────────────────────────────────

/// One customer's result as reported to people and external systems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCustomer {
    pub customer_id:         CustomerId,
    pub email:               String,
    pub source:              SourceKind,
    /// Percent, rounded to one decimal place.
    pub churn_probability:   f64,
    pub risk_level:          RiskLevel,
    pub risk_factors:        Vec<RiskSignal>,
    pub retention_triggered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub total:       usize,
    pub high_risk:   usize,
    pub medium_risk: usize,
    pub low_risk:    usize,
    /// Mean churn probability in percent; 0 for an empty batch.
    pub avg_churn:   f64,
}

impl BatchSummary {
    pub fn from_results(results: &[ScoredCustomer]) -> Self {
        let count = |level: RiskLevel| results.iter().filter(|r| r.risk_level == level).count();
        let total = results.len();
        let avg_churn = if total == 0 {
            0.0
        } else {
            results.iter().map(|r| r.churn_probability).sum::<f64>() / total as f64
        };

        Self {
            total,
            high_risk: count(RiskLevel::High),
            medium_risk: count(RiskLevel::Medium),
            low_risk: count(RiskLevel::Low),
            avg_churn,
        }
    }

    /// Share of the batch in percent; 0 for an empty batch.
    pub fn share(&self, n: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            n as f64 / self.total as f64 * 100.0
        }
    }
}

pub fn high_risk(results: &[ScoredCustomer]) -> Vec<&ScoredCustomer> {
    results.iter().filter(|r| r.risk_level == RiskLevel::High).collect()
}

/// Converts a [0,1] probability to the reported percent with one decimal.
pub fn to_percent(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}

// ── Text report ──────────────────────────────────────────────────────────────

/// Plain-text daily report. Render with `to_string()` or `{}`.
pub struct DailyReport<'a> {
    pub results:      &'a [ScoredCustomer],
    pub generated_at: DateTime<Utc>,
    /// High-risk customers listed by name.
    pub top_n:        usize,
}

impl fmt::Display for DailyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = BatchSummary::from_results(self.results);

        writeln!(f, "=== DAILY CHURN REPORT ===")?;
        writeln!(f, "  generated:      {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f)?;
        writeln!(f, "--- OVERVIEW ---")?;
        writeln!(f, "  customers analyzed:  {}", summary.total)?;
        writeln!(f, "  avg churn prob:      {:.1}%", summary.avg_churn)?;
        writeln!(f)?;
        writeln!(f, "--- RISK DISTRIBUTION ---")?;
        for (label, n) in [
            ("High   (>=60%):  ", summary.high_risk),
            ("Medium (30-59%): ", summary.medium_risk),
            ("Low    (<30%):   ", summary.low_risk),
        ] {
            writeln!(f, "  {label}    {n} ({:.1}%)", summary.share(n))?;
        }
        writeln!(f)?;
        writeln!(f, "--- ACTION REQUIRED ---")?;

        let flagged = high_risk(self.results);
        if flagged.is_empty() {
            return writeln!(f, "  No high-risk customers detected");
        }
        writeln!(f, "  {} customers need immediate attention:", flagged.len())?;
        for customer in flagged.iter().take(self.top_n) {
            writeln!(f, "  - {}: {:.1}%", display_name(customer), customer.churn_probability)?;
        }
        Ok(())
    }
}

pub fn render_daily_report(results: &[ScoredCustomer], generated_at: DateTime<Utc>, top_n: usize) -> String {
    DailyReport { results, generated_at, top_n }.to_string()
}

pub(crate) fn display_name(customer: &ScoredCustomer) -> &str {
    if customer.email.is_empty() {
        &customer.customer_id
    } else {
        &customer.email
    }
}

// ── JSON report ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChurnReport {
    pub run_id:    RunId,
    /// `YYYYMMDD_HHMMSS`, also used in the file name.
    pub timestamp: String,
    pub results:   Vec<ScoredCustomer>,
    pub summary:   BatchSummary,
}

impl ChurnReport {
    pub fn new(run_id: RunId, generated_at: DateTime<Utc>, results: Vec<ScoredCustomer>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self {
            run_id,
            timestamp: generated_at.format("%Y%m%d_%H%M%S").to_string(),
            results,
            summary,
        }
    }

    pub fn file_name(&self) -> String {
        format!("churn_report_{}.json", self.timestamp)
    }

    /// Writes `{dir}/churn_report_{timestamp}.json`, creating `dir` if needed.
    pub fn write_to(&self, dir: &Path) -> MonitorResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        log::info!("report: wrote {} ({} customers)", path.display(), self.summary.total);
        Ok(path)
    }
}

// ── CSV export ───────────────────────────────────────────────────────────────

pub const RESULTS_CSV_HEADER: [&str; 7] = [
    "id",
    "email",
    "churnProbability",
    "riskLevel",
    "topRiskFactor1",
    "topRiskFactor2",
    "topRiskFactor3",
];

/// One row per customer with the three heaviest triggered factors.
pub fn write_results_csv(results: &[ScoredCustomer], path: &Path) -> MonitorResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(RESULTS_CSV_HEADER)?;

    for r in results {
        let factor = |i: usize| r.risk_factors.get(i).map_or("", RiskSignal::label);
        let probability = format!("{:.1}", r.churn_probability);
        let level = r.risk_level.to_string();
        writer.write_record([
            r.customer_id.as_str(),
            r.email.as_str(),
            probability.as_str(),
            level.as_str(),
            factor(0),
            factor(1),
            factor(2),
        ])?;
    }
    writer.flush()?;

    log::info!("report: wrote {} ({} rows)", path.display(), results.len());
    Ok(())
}
