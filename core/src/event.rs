//! Run events — what happened to each record during one monitoring run.
//!
//! Events are collected in processing order and logged; they are the
//! audit trail for side effects that reached external systems.

use crate::{
    scorer::RiskLevel,
    types::{CustomerId, RunId, SourceKind},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    RunStarted {
        run_id: RunId,
        record_count: usize,
    },
    RecordSkipped {
        customer_id: CustomerId,
        source: SourceKind,
        reason: String,
    },
    CustomerScored {
        customer_id: CustomerId,
        churn_probability: f64,
        risk_level: RiskLevel,
    },
    RiskTagUpdated {
        customer_id: CustomerId,
        tag: String,
        ok: bool,
    },
    RetentionTriggered {
        customer_id: CustomerId,
        ok: bool,
    },
    AlertSent {
        high_risk_count: usize,
        delivered: bool,
    },
}
