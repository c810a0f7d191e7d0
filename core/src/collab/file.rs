use super::RecordSource;
use crate::{
    error::{MonitorError, MonitorResult},
    extract::RawRecord,
    types::SourceKind,
};
use serde_json::Value;
use std::path::PathBuf;

/// Reads records of one source kind from a JSON file.
///
/// Accepts a bare array, or the envelope the live APIs return
/// (`{"contacts": [...]}` or `{"data": [...]}`).
pub struct JsonFileSource {
    path: PathBuf,
    kind: SourceKind,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, kind: SourceKind) -> Self {
        Self { path: path.into(), kind }
    }

    pub fn parse(content: &str, kind: SourceKind) -> MonitorResult<Vec<RawRecord>> {
        let parsed: Value = serde_json::from_str(content)?;
        let items = match parsed {
            Value::Array(items) => items,
            Value::Object(mut map) => match ["contacts", "data", "customers"]
                .iter()
                .find_map(|key| map.remove(*key))
            {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(MonitorError::UnexpectedPayload {
                        endpoint: "file".into(),
                        detail: "expected an array or a contacts/data/customers envelope".into(),
                    })
                }
            },
            other => vec![other],
        };
        Ok(items.into_iter().map(|body| RawRecord::new(kind, body)).collect())
    }
}

impl RecordSource for JsonFileSource {
    fn name(&self) -> &'static str { "file" }

    fn fetch(&self) -> MonitorResult<Vec<RawRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        let records = Self::parse(&content, self.kind)?;
        log::info!(
            "file: loaded {} {} records from {}",
            records.len(),
            self.kind.as_str(),
            self.path.display(),
        );
        Ok(records)
    }
}
