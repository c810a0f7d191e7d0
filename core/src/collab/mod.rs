//! Collaborators — the edges of the monitor.
//!
//! RULE: Collaborators own every network and file concern. The extractor
//! and scorer never see a client, a credential, or an HTTP status.
//! Credentials arrive through constructors, never through globals.

pub mod bulk;
pub mod crm;
pub mod file;
pub mod http;
pub mod membership;

use crate::{error::MonitorResult, extract::RawRecord, scorer::RiskLevel};

pub use bulk::BulkCsvSource;
pub use crm::CrmClient;
pub use file::JsonFileSource;
pub use membership::MembershipClient;

/// Produces the raw records for one run.
pub trait RecordSource {
    fn name(&self) -> &'static str;

    fn fetch(&self) -> MonitorResult<Vec<RawRecord>>;
}

/// Writes risk results back into a system of record.
pub trait RiskTagger {
    /// Replace the contact's churn-risk tag with `churn-risk-{level}`.
    fn update_risk_tag(
        &self,
        customer_id: &str,
        level: RiskLevel,
        churn_probability_pct: f64,
    ) -> MonitorResult<()>;

    /// Start the retention workflow for a contact.
    /// Returns `Ok(false)` when no workflow is configured.
    fn trigger_retention(&self, customer_id: &str) -> MonitorResult<bool>;
}

pub fn risk_tag(level: RiskLevel) -> String {
    format!("churn-risk-{}", level.as_str())
}
