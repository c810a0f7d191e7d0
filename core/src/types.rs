//! Shared primitive types used across the monitor.

use serde::{Deserialize, Serialize};

/// Stable identifier of a customer in its source system.
pub type CustomerId = String;

/// The canonical run identifier.
pub type RunId = String;

/// Which upstream system a raw record came from.
/// Field naming differs per source; the extractor maps all of them onto
/// the same canonical metrics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Flat records posted to the generic prediction API.
    PredictionApi,
    /// CRM contacts with a `customField` list.
    Crm,
    /// Membership-platform records with nested `plan` / `user` objects.
    Membership,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::PredictionApi => "prediction_api",
            SourceKind::Crm           => "crm",
            SourceKind::Membership    => "membership",
        }
    }

    /// Accepts the snake_case name plus a few short aliases used on the CLI.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "prediction_api" | "prediction" | "api" => Some(SourceKind::PredictionApi),
            "crm"                                   => Some(SourceKind::Crm),
            "membership" | "members"                => Some(SourceKind::Membership),
            _ => None,
        }
    }
}
