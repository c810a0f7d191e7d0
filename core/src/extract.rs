//! Metric extraction — raw source records → `CanonicalCustomerMetrics`.
//!
//! RULES:
//!   - Extraction never fails. A missing or malformed field is treated
//!     as absent and resolved from `ExtractionDefaults`.
//!   - Every source reader only collects `RawFields`; defaulting happens
//!     in exactly one place (`resolve`).
//!   - No side effects. The evaluation time is always passed in.

use crate::{
    metrics::{CanonicalCustomerMetrics, ContractType, PaymentMethod},
    types::{CustomerId, SourceKind},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ── Public types ─────────────────────────────────────────────────────────────

/// One heterogeneous record as delivered by a collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    pub source: SourceKind,
    pub body:   Value,
}

impl RawRecord {
    pub fn new(source: SourceKind, body: Value) -> Self {
        Self { source, body }
    }
}

/// Who a record belongs to. Empty strings when the source omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub customer_id: CustomerId,
    pub email:       String,
}

/// The defaulting table. One value per canonical field, applied whenever a
/// source record omits that field or carries an unparseable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionDefaults {
    pub subscription_age_months:  f64,
    pub monthly_charge:           f64,
    pub content_completion_pct:   f64,
    pub failed_payments_count:    u32,
    pub payment_method:           PaymentMethod,
    pub support_tickets_90d:      u32,
    pub contract_type:            ContractType,
    pub days_since_last_activity: u32,
    /// Window used to estimate logins from recency when no count is tracked.
    pub login_window_days:        u32,
}

impl Default for ExtractionDefaults {
    fn default() -> Self {
        Self {
            subscription_age_months:  1.0,
            monthly_charge:           50.0,
            content_completion_pct:   50.0,
            failed_payments_count:    0,
            payment_method:           PaymentMethod::CreditCard,
            support_tickets_90d:      0,
            contract_type:            ContractType::Monthly,
            days_since_last_activity: 30,
            login_window_days:        30,
        }
    }
}

/// Extracts with the built-in defaults table.
pub fn extract_metrics(record: &RawRecord, evaluation_time: DateTime<Utc>) -> CanonicalCustomerMetrics {
    Extractor::default().extract(record, evaluation_time)
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    defaults: ExtractionDefaults,
}

impl Extractor {
    pub fn new(defaults: ExtractionDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ExtractionDefaults {
        &self.defaults
    }

    pub fn extract(&self, record: &RawRecord, evaluation_time: DateTime<Utc>) -> CanonicalCustomerMetrics {
        let fields = match record.source {
            SourceKind::PredictionApi => read_prediction_api(&record.body),
            SourceKind::Crm           => read_crm_contact(&record.body),
            SourceKind::Membership    => read_membership(&record.body),
        };
        resolve(&fields, evaluation_time, &self.defaults)
    }
}

pub fn identify(record: &RawRecord) -> CustomerIdentity {
    let body = &record.body;
    let email = match record.source {
        SourceKind::Membership => body.pointer("/user/email").and_then(text),
        _ => body.get("email").and_then(text),
    };
    let customer_id = match record.source {
        SourceKind::PredictionApi => lookup(body, &["customer_id", "customerId", "id"]),
        _ => body.get("id"),
    }
    .and_then(text);

    CustomerIdentity {
        customer_id: customer_id.unwrap_or_default(),
        email:       email.unwrap_or_default(),
    }
}

/// Tags carried by a CRM contact; empty for other sources.
pub fn contact_tags(record: &RawRecord) -> Vec<String> {
    record.body
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(text).collect())
        .unwrap_or_default()
}

// ── Timestamp parsing ────────────────────────────────────────────────────────

/// Offset-bearing layouts. `%#z` takes `Z`, `+02`, `+0200` and `+02:00`.
const OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%#z",
    "%Y%m%dT%H%M%#z",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

/// ISO-8601 with or without an offset, extended or basic layout. Naive
/// timestamps and bare dates are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    ["%Y-%m-%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Strings go through `parse_timestamp`; numbers are Unix epoch seconds,
/// or milliseconds when too large to be seconds.
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            if raw.abs() >= 100_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

// ── Field readers ────────────────────────────────────────────────────────────

/// Everything a source reader could find. `None` means absent or malformed.
#[derive(Debug, Default)]
struct RawFields {
    subscription_age_months:  Option<f64>,
    subscription_start:       Option<DateTime<Utc>>,
    monthly_charge:           Option<f64>,
    login_frequency_30d:      Option<u32>,
    content_completion_pct:   Option<f64>,
    failed_payments_count:    Option<u32>,
    payment_method:           Option<PaymentMethod>,
    support_tickets_90d:      Option<u32>,
    contract_type:            Option<ContractType>,
    days_since_last_activity: Option<u32>,
    last_activity:            Option<DateTime<Utc>>,
}

fn lookup<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| body.get(*k).filter(|v| !v.is_null()))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative finite number, from a JSON number or a numeric string.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite() && *x >= 0.0)
}

fn count(value: &Value) -> Option<u32> {
    number(value).map(|x| x.floor().min(u32::MAX as f64) as u32)
}

fn read_prediction_api(body: &Value) -> RawFields {
    let get = |keys: &[&str]| lookup(body, keys);
    RawFields {
        subscription_age_months:  get(&["subscription_age", "subscriptionAge", "subscription_age_months"]).and_then(number),
        subscription_start:       get(&["subscription_start", "subscriptionStart"]).and_then(timestamp),
        monthly_charge:           get(&["monthly_charge", "monthlyCharge"]).and_then(number),
        login_frequency_30d:      get(&["login_frequency", "loginFrequency", "login_frequency_30d"]).and_then(count),
        content_completion_pct:   get(&["content_completion", "contentCompletion"]).and_then(number),
        failed_payments_count:    get(&["failed_payments", "failedPayments"]).and_then(count),
        payment_method:           get(&["payment_method", "paymentMethod"]).and_then(text).and_then(|s| PaymentMethod::parse(&s)),
        support_tickets_90d:      get(&["support_tickets", "supportTickets", "support_tickets_90d"]).and_then(count),
        contract_type:            get(&["contract_type", "contractType"]).and_then(text).and_then(|s| ContractType::parse(&s)),
        days_since_last_activity: get(&["days_since_last_activity", "daysSinceLastActivity"]).and_then(count),
        last_activity:            get(&["last_activity_at", "lastActivityAt"]).and_then(timestamp),
    }
}

fn read_crm_contact(body: &Value) -> RawFields {
    let custom: HashMap<&str, &Value> = body
        .get("customField")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|cf| Some((cf.get("key")?.as_str()?, cf.get("value")?)))
                .collect()
        })
        .unwrap_or_default();
    let get = |key: &str| custom.get(key).copied();

    RawFields {
        subscription_start:     get("subscription_start_date").and_then(timestamp),
        monthly_charge:         get("monthly_charge").and_then(number),
        login_frequency_30d:    get("login_frequency_30d").and_then(count),
        content_completion_pct: get("content_completion_rate").and_then(number),
        failed_payments_count:  get("failed_payments").and_then(count),
        payment_method:         get("payment_method").and_then(text).and_then(|s| PaymentMethod::parse(&s)),
        support_tickets_90d:    get("support_tickets_90d").and_then(count),
        contract_type:          get("contract_type").and_then(text).and_then(|s| ContractType::parse(&s)),
        last_activity:          body.get("lastActivity").and_then(timestamp),
        ..RawFields::default()
    }
}

fn read_membership(body: &Value) -> RawFields {
    let created_at = body.get("created_at").and_then(timestamp);
    let last_access = body.get("last_access_at").and_then(timestamp).or(created_at);

    // Any billing period other than monthly is sold as an annual plan.
    let contract_type = body
        .pointer("/plan/billing_period")
        .and_then(text)
        .map(|period| ContractType::parse(&period).unwrap_or(ContractType::Annual));

    RawFields {
        subscription_start:    created_at,
        monthly_charge:        body.pointer("/plan/price").and_then(number).map(|cents| cents / 100.0),
        failed_payments_count: body.get("failed_payment_count").and_then(count),
        payment_method:        body.get("payment_processor").and_then(text).and_then(|s| PaymentMethod::parse(&s)),
        contract_type,
        last_activity:         last_access,
        ..RawFields::default()
    }
}

// ── Defaulting ───────────────────────────────────────────────────────────────

fn whole_days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    (now - then).num_days().clamp(0, u32::MAX as i64) as u32
}

fn resolve(
    fields: &RawFields,
    evaluation_time: DateTime<Utc>,
    defaults: &ExtractionDefaults,
) -> CanonicalCustomerMetrics {
    let subscription_age_months = fields
        .subscription_age_months
        .or_else(|| {
            fields
                .subscription_start
                .map(|start| whole_days_since(start, evaluation_time) as f64 / 30.0)
        })
        .unwrap_or(defaults.subscription_age_months)
        .max(0.0);

    let days_since_last_activity = fields
        .days_since_last_activity
        .or_else(|| fields.last_activity.map(|at| whole_days_since(at, evaluation_time)))
        .unwrap_or(defaults.days_since_last_activity);

    let login_frequency_30d = fields
        .login_frequency_30d
        .unwrap_or_else(|| defaults.login_window_days.saturating_sub(days_since_last_activity));

    CanonicalCustomerMetrics {
        subscription_age_months,
        monthly_charge: fields.monthly_charge.unwrap_or(defaults.monthly_charge).max(0.0),
        login_frequency_30d,
        content_completion_pct: fields
            .content_completion_pct
            .unwrap_or(defaults.content_completion_pct)
            .max(0.0)
            .min(100.0),
        failed_payments_count: fields.failed_payments_count.unwrap_or(defaults.failed_payments_count),
        payment_method: fields.payment_method.unwrap_or(defaults.payment_method),
        support_tickets_90d: fields.support_tickets_90d.unwrap_or(defaults.support_tickets_90d),
        contract_type: fields.contract_type.unwrap_or(defaults.contract_type),
        days_since_last_activity,
    }
}
