//! Scorer properties: range, determinism, monotonicity, thresholds.

use churnwatch_core::{
    metrics::{CanonicalCustomerMetrics, ContractType, PaymentMethod},
    scorer::{score, RiskLevel, RiskSignal},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A customer that triggers no rule at all.
fn healthy() -> CanonicalCustomerMetrics {
    CanonicalCustomerMetrics {
        subscription_age_months:  12.0,
        monthly_charge:           49.0,
        login_frequency_30d:      10,
        content_completion_pct:   80.0,
        failed_payments_count:    0,
        payment_method:           PaymentMethod::CreditCard,
        support_tickets_90d:      0,
        contract_type:            ContractType::Annual,
        days_since_last_activity: 5,
    }
}

/// Flip exactly one rule's condition from false to true.
fn trigger(mut m: CanonicalCustomerMetrics, signal: RiskSignal) -> CanonicalCustomerMetrics {
    match signal {
        RiskSignal::LowLoginFrequency    => m.login_frequency_30d = 2,
        RiskSignal::HighInactivity       => m.days_since_last_activity = 20,
        RiskSignal::LowContentCompletion => m.content_completion_pct = 10.0,
        RiskSignal::FailedPayments       => m.failed_payments_count = 1,
        RiskSignal::BankTransferPayment  => m.payment_method = PaymentMethod::BankTransfer,
        RiskSignal::NewCustomer          => m.subscription_age_months = 1.0,
        RiskSignal::MonthlyContract      => m.contract_type = ContractType::Monthly,
        RiskSignal::HighSupportTickets   => m.support_tickets_90d = 3,
    }
    m
}

/// All 256 combinations of the eight conditions.
fn every_combination() -> Vec<(u32, CanonicalCustomerMetrics)> {
    (0u32..256)
        .map(|mask| {
            let m = RiskSignal::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .fold(healthy(), |m, (_, s)| trigger(m, *s));
            (mask, m)
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn healthy_customer_scores_zero_and_low() {
    let a = score(&healthy());
    assert_eq!(a.churn_probability, 0.0);
    assert_eq!(a.risk_level, RiskLevel::Low);
    assert!(a.risk_factors.is_empty());
}

#[test]
fn every_condition_clamps_to_one_and_high() {
    let m = RiskSignal::ALL.iter().fold(healthy(), |m, s| trigger(m, *s));
    let a = score(&m);

    // 0.40+0.30+0.25+0.20+0.15+0.10+0.15+0.20 = 1.75 → 1.0
    assert_eq!(a.churn_probability, 1.0);
    assert_eq!(a.risk_level, RiskLevel::High);
    assert_eq!(a.risk_factors.len(), 8);
}

#[test]
fn probability_always_within_unit_interval() {
    for (mask, m) in every_combination() {
        let p = score(&m).churn_probability;
        assert!((0.0..=1.0).contains(&p), "mask={mask:08b}: p={p} outside [0,1]");
    }
}

#[test]
fn scoring_is_idempotent() {
    for (mask, m) in every_combination() {
        assert_eq!(score(&m), score(&m), "mask={mask:08b}: repeated score differs");
    }
}

#[test]
fn flipping_one_condition_never_lowers_probability() {
    for (mask, m) in every_combination() {
        let before = score(&m).churn_probability;
        for (i, signal) in RiskSignal::ALL.iter().enumerate() {
            if mask & (1 << i) != 0 {
                continue;
            }
            let after = score(&trigger(m, *signal)).churn_probability;
            assert!(
                after >= before,
                "mask={mask:08b} + {signal:?}: {before} → {after} decreased"
            );
        }
    }
}

#[test]
fn each_rule_contributes_its_table_weight() {
    let expected = [
        (RiskSignal::LowLoginFrequency, 0.30),
        (RiskSignal::HighInactivity, 0.25),
        (RiskSignal::LowContentCompletion, 0.20),
        (RiskSignal::FailedPayments, 0.40),
        (RiskSignal::BankTransferPayment, 0.15),
        (RiskSignal::NewCustomer, 0.10),
        (RiskSignal::MonthlyContract, 0.15),
        (RiskSignal::HighSupportTickets, 0.20),
    ];
    for (signal, weight) in expected {
        let a = score(&trigger(healthy(), signal));
        assert_eq!(a.churn_probability, weight, "{signal:?} weight");
        assert_eq!(a.risk_factors, vec![signal]);
    }
}

#[test]
fn rule_thresholds_are_strict() {
    let mut m = healthy();
    m.login_frequency_30d = 5;
    m.days_since_last_activity = 14;
    m.content_completion_pct = 30.0;
    m.subscription_age_months = 2.0;
    m.support_tickets_90d = 2;
    assert_eq!(score(&m).churn_probability, 0.0, "boundary values must not trigger");
}

#[test]
fn risk_level_boundaries() {
    assert_eq!(RiskLevel::from_probability(0.60), RiskLevel::High);
    assert_eq!(RiskLevel::from_probability(0.5999), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_probability(0.30), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_probability(0.2999), RiskLevel::Low);
    assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
    assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
}

#[test]
fn summed_weights_land_exactly_on_thresholds() {
    // 0.30 + 0.15 + 0.15
    let m = trigger(
        trigger(trigger(healthy(), RiskSignal::LowLoginFrequency), RiskSignal::BankTransferPayment),
        RiskSignal::MonthlyContract,
    );
    let a = score(&m);
    assert_eq!(a.churn_probability, 0.60);
    assert_eq!(a.risk_level, RiskLevel::High);

    // 0.15 + 0.15
    let m = trigger(trigger(healthy(), RiskSignal::BankTransferPayment), RiskSignal::MonthlyContract);
    let a = score(&m);
    assert_eq!(a.churn_probability, 0.30);
    assert_eq!(a.risk_level, RiskLevel::Medium);

    // 0.10 + 0.15
    let m = trigger(trigger(healthy(), RiskSignal::NewCustomer), RiskSignal::MonthlyContract);
    assert_eq!(score(&m).risk_level, RiskLevel::Low);
}

#[test]
fn risk_factors_ordered_by_weight_then_table_order() {
    let m = RiskSignal::ALL.iter().fold(healthy(), |m, s| trigger(m, *s));
    let factors = score(&m).risk_factors;

    assert_eq!(
        factors,
        vec![
            RiskSignal::FailedPayments,
            RiskSignal::LowLoginFrequency,
            RiskSignal::HighInactivity,
            RiskSignal::LowContentCompletion,
            RiskSignal::HighSupportTickets,
            RiskSignal::BankTransferPayment,
            RiskSignal::MonthlyContract,
            RiskSignal::NewCustomer,
        ]
    );
}
