//! Canonical, source-agnostic customer metrics consumed by the scorer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    Other,
}

impl PaymentMethod {
    /// Case- and separator-insensitive. Empty input counts as absent;
    /// any other unrecognised value is `Other`.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize(raw);
        if key.is_empty() {
            return None;
        }
        let method = match key.as_str() {
            "creditcard" | "card" | "credit" | "debitcard" | "stripe" => PaymentMethod::CreditCard,
            "banktransfer" | "bank" | "ach" | "sepa" | "wire"          => PaymentMethod::BankTransfer,
            _ => PaymentMethod::Other,
        };
        Some(method)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Monthly,
    Annual,
}

impl ContractType {
    /// Returns `None` for values that name neither contract type.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "monthly" | "month"                       => Some(ContractType::Monthly),
            "annual" | "annually" | "yearly" | "year" => Some(ContractType::Annual),
            _ => None,
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// One customer snapshot. Built fresh for every evaluation run; every
/// field is always populated (the extractor fills defaults).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CanonicalCustomerMetrics {
    pub subscription_age_months:  f64,
    pub monthly_charge:           f64,
    pub login_frequency_30d:      u32,
    pub content_completion_pct:   f64,
    pub failed_payments_count:    u32,
    pub payment_method:           PaymentMethod,
    pub support_tickets_90d:      u32,
    pub contract_type:            ContractType,
    pub days_since_last_activity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_accepts_display_and_snake_forms() {
        assert_eq!(PaymentMethod::parse("Bank transfer"), Some(PaymentMethod::BankTransfer));
        assert_eq!(PaymentMethod::parse("bank_transfer"), Some(PaymentMethod::BankTransfer));
        assert_eq!(PaymentMethod::parse("Credit card"), Some(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::parse("stripe"), Some(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::parse("PayPal"), Some(PaymentMethod::Other));
        assert_eq!(PaymentMethod::parse("  "), None);
    }

    #[test]
    fn contract_type_rejects_unknown_values() {
        assert_eq!(ContractType::parse("Annual"), Some(ContractType::Annual));
        assert_eq!(ContractType::parse("month"), Some(ContractType::Monthly));
        assert_eq!(ContractType::parse("Quarterly"), None);
    }
}
