//! Churn risk scoring — additive weighted rules over canonical metrics.
//!
//! Every rule contributes a fixed weight when its condition holds. The
//! sum is capped at 1.0. No state, no randomness: identical metrics always
//! produce an identical assessment.
//!
//! Weights are held in basis points and summed as integers, so
//! combinations such as 0.30 + 0.15 + 0.15 land exactly on a threshold.

use crate::metrics::{CanonicalCustomerMetrics, ContractType, PaymentMethod};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which a customer is `High` risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.60;
/// Probability at or above which a customer is at least `Medium` risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.30;

const BASIS_POINTS: u32 = 10_000;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Lowercase form used in tags, e.g. `churn-risk-high`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low    => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High   => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low    => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High   => "High",
        };
        f.write_str(label)
    }
}

/// One scoring rule. Declared in table order; that order only matters for
/// breaking ties when listing triggered factors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskSignal {
    LowLoginFrequency,
    HighInactivity,
    LowContentCompletion,
    FailedPayments,
    BankTransferPayment,
    NewCustomer,
    MonthlyContract,
    HighSupportTickets,
}

impl RiskSignal {
    pub const ALL: [RiskSignal; 8] = [
        RiskSignal::LowLoginFrequency,
        RiskSignal::HighInactivity,
        RiskSignal::LowContentCompletion,
        RiskSignal::FailedPayments,
        RiskSignal::BankTransferPayment,
        RiskSignal::NewCustomer,
        RiskSignal::MonthlyContract,
        RiskSignal::HighSupportTickets,
    ];

    pub fn weight_bp(&self) -> u32 {
        match self {
            RiskSignal::LowLoginFrequency    => 3_000,
            RiskSignal::HighInactivity       => 2_500,
            RiskSignal::LowContentCompletion => 2_000,
            RiskSignal::FailedPayments       => 4_000,
            RiskSignal::BankTransferPayment  => 1_500,
            RiskSignal::NewCustomer          => 1_000,
            RiskSignal::MonthlyContract      => 1_500,
            RiskSignal::HighSupportTickets   => 2_000,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight_bp() as f64 / BASIS_POINTS as f64
    }

    pub fn applies(&self, m: &CanonicalCustomerMetrics) -> bool {
        match self {
            RiskSignal::LowLoginFrequency    => m.login_frequency_30d < 5,
            RiskSignal::HighInactivity       => m.days_since_last_activity > 14,
            RiskSignal::LowContentCompletion => m.content_completion_pct < 30.0,
            RiskSignal::FailedPayments       => m.failed_payments_count > 0,
            RiskSignal::BankTransferPayment  => m.payment_method == PaymentMethod::BankTransfer,
            RiskSignal::NewCustomer          => m.subscription_age_months < 2.0,
            RiskSignal::MonthlyContract      => m.contract_type == ContractType::Monthly,
            RiskSignal::HighSupportTickets   => m.support_tickets_90d > 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskSignal::LowLoginFrequency    => "Low Login Frequency",
            RiskSignal::HighInactivity       => "High Inactivity",
            RiskSignal::LowContentCompletion => "Low Content Completion",
            RiskSignal::FailedPayments       => "Failed Payments",
            RiskSignal::BankTransferPayment  => "Bank Transfer Payment",
            RiskSignal::NewCustomer          => "New Customer",
            RiskSignal::MonthlyContract      => "Monthly Contract",
            RiskSignal::HighSupportTickets   => "High Support Tickets",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChurnAssessment {
    pub churn_probability: f64,
    pub risk_level:        RiskLevel,
    /// Triggered rules, heaviest first.
    pub risk_factors:      Vec<RiskSignal>,
}

// ── Scoring ──────────────────────────────────────────────────────────────────

pub fn score(metrics: &CanonicalCustomerMetrics) -> ChurnAssessment {
    let mut risk_factors: Vec<RiskSignal> = RiskSignal::ALL
        .iter()
        .copied()
        .filter(|signal| signal.applies(metrics))
        .collect();

    let total_bp: u32 = risk_factors.iter().map(RiskSignal::weight_bp).sum();
    let churn_probability = total_bp.min(BASIS_POINTS) as f64 / BASIS_POINTS as f64;

    // Stable sort keeps table order among equal weights.
    risk_factors.sort_by(|a, b| b.weight_bp().cmp(&a.weight_bp()));

    ChurnAssessment {
        churn_probability,
        risk_level: RiskLevel::from_probability(churn_probability),
        risk_factors,
    }
}
