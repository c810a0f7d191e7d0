//! Single-record prediction: one JSON request in, one JSON response out.
//!
//! Every input line gets exactly one reply. Bad input yields an
//! `{"error": ...}` object instead of a failure so a line-oriented caller
//! can keep going.

use crate::{
    extract::{Extractor, RawRecord},
    scorer::score,
    types::SourceKind,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionResponse {
    /// Probability in [0,1], not a percent.
    pub churn_probability: f64,
    pub risk_level:        String,
    pub risk_factors:      Vec<&'static str>,
}

/// Scores one prediction-API request line.
pub fn respond(line: &str, extractor: &Extractor, evaluation_time: DateTime<Utc>) -> Value {
    let body: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return json!({ "error": e.to_string() }),
    };
    if !body.is_object() {
        return json!({ "error": "expected a JSON object" });
    }

    let record = RawRecord::new(SourceKind::PredictionApi, body);
    let assessment = score(&extractor.extract(&record, evaluation_time));
    let response = PredictionResponse {
        churn_probability: assessment.churn_probability,
        risk_level:        assessment.risk_level.to_string(),
        risk_factors:      assessment.risk_factors.iter().map(|f| f.label()).collect(),
    };

    serde_json::to_value(&response).unwrap_or_else(|e| json!({ "error": e.to_string() }))
}
