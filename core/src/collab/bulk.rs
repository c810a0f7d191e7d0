use super::RecordSource;
use crate::{error::MonitorResult, extract::RawRecord, types::SourceKind};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Header of the bulk-upload template. Columns may appear in any order;
/// unknown columns are carried along and ignored by the extractor.
pub const TEMPLATE_HEADER: [&str; 12] = [
    "id",
    "name",
    "email",
    "subscriptionAge",
    "monthlyCharge",
    "loginFrequency",
    "contentCompletion",
    "failedPayments",
    "paymentMethod",
    "supportTickets",
    "contractType",
    "daysSinceLastActivity",
];

/// Bulk CSV upload. Each row becomes one prediction-API record keyed by
/// the header names.
pub struct BulkCsvSource {
    path: PathBuf,
}

impl BulkCsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Rows without an `id` get `customer-{row}`, counting data rows from 1.
    /// Blank cells are left out so the field takes its default.
    pub fn parse(content: &str) -> MonitorResult<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row?;
            let mut body: Map<String, Value> = headers
                .iter()
                .zip(row.iter())
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
                .collect();
            if body.is_empty() {
                continue;
            }
            body.entry("id")
                .or_insert_with(|| Value::String(format!("customer-{}", i + 1)));
            records.push(RawRecord::new(SourceKind::PredictionApi, Value::Object(body)));
        }
        Ok(records)
    }
}

impl RecordSource for BulkCsvSource {
    fn name(&self) -> &'static str { "csv" }

    fn fetch(&self) -> MonitorResult<Vec<RawRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        let records = Self::parse(&content)?;
        log::info!("csv: loaded {} rows from {}", records.len(), self.path.display());
        Ok(records)
    }
}
