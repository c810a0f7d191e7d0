//! Churn monitor — one batch run over a set of raw records.
//!
//! A run has two phases:
//!   1. `evaluate`  — filter, extract, score. Pure; no I/O.
//!   2. `dispatch`  — push results to collaborators (tags, retention
//!      workflow, alert). A failed call is logged and recorded as an
//!      event; it never aborts the rest of the batch.
//!
//! Records are independent. Input order carries no meaning, but results
//! and events keep it so runs are reproducible.

use crate::{
    alert::Notifier,
    collab::{risk_tag, RiskTagger},
    config::MonitorConfig,
    event::MonitorEvent,
    extract::{contact_tags, identify, Extractor, RawRecord},
    report::{high_risk, to_percent, ScoredCustomer},
    scorer::{score, RiskLevel},
    types::{RunId, SourceKind},
};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct MonitorOutcome {
    pub results: Vec<ScoredCustomer>,
    pub events:  Vec<MonitorEvent>,
}

pub fn new_run_id() -> RunId {
    format!("run-{}", uuid::Uuid::new_v4())
}

pub struct ChurnMonitor {
    run_id:    RunId,
    config:    MonitorConfig,
    extractor: Extractor,
}

impl ChurnMonitor {
    pub fn new(run_id: RunId, config: MonitorConfig) -> Self {
        let extractor = Extractor::new(config.defaults.clone());
        Self { run_id, config, extractor }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// CRM contacts are only evaluated while they carry the active tag.
    fn skip_reason(&self, record: &RawRecord) -> Option<String> {
        if record.source != SourceKind::Crm {
            return None;
        }
        let active_tag = &self.config.crm.active_tag;
        if contact_tags(record).iter().any(|t| t == active_tag) {
            None
        } else {
            Some(format!("missing tag '{active_tag}'"))
        }
    }

    pub fn evaluate(&self, records: &[RawRecord], evaluation_time: DateTime<Utc>) -> MonitorOutcome {
        let mut outcome = MonitorOutcome::default();
        outcome.events.push(MonitorEvent::RunStarted {
            run_id: self.run_id.clone(),
            record_count: records.len(),
        });

        for record in records {
            let identity = identify(record);

            if let Some(reason) = self.skip_reason(record) {
                log::debug!("monitor: skipping {} ({reason})", identity.customer_id);
                outcome.events.push(MonitorEvent::RecordSkipped {
                    customer_id: identity.customer_id,
                    source: record.source,
                    reason,
                });
                continue;
            }

            let metrics = self.extractor.extract(record, evaluation_time);
            let assessment = score(&metrics);

            log::debug!(
                "monitor: {} p={:.2} level={} factors={:?}",
                identity.customer_id,
                assessment.churn_probability,
                assessment.risk_level,
                assessment.risk_factors,
            );

            outcome.events.push(MonitorEvent::CustomerScored {
                customer_id: identity.customer_id.clone(),
                churn_probability: assessment.churn_probability,
                risk_level: assessment.risk_level,
            });
            outcome.results.push(ScoredCustomer {
                customer_id:         identity.customer_id,
                email:               identity.email,
                source:              record.source,
                churn_probability:   to_percent(assessment.churn_probability),
                risk_level:          assessment.risk_level,
                risk_factors:        assessment.risk_factors,
                retention_triggered: false,
            });
        }

        log::info!(
            "run={} monitor: scored {} of {} records ({} high risk)",
            self.run_id,
            outcome.results.len(),
            records.len(),
            high_risk(&outcome.results).len(),
        );
        outcome
    }

    /// Tags CRM contacts, starts retention for high-risk ones, then sends
    /// one alert covering every high-risk customer in the batch.
    pub fn dispatch(
        &self,
        outcome: &mut MonitorOutcome,
        tagger: Option<&dyn RiskTagger>,
        notifier: &dyn Notifier,
    ) {
        if let Some(tagger) = tagger {
            for result in outcome.results.iter_mut().filter(|r| r.source == SourceKind::Crm) {
                if result.customer_id.trim().is_empty() {
                    log::warn!("monitor: contact without an id, skipping tag update and retention");
                    outcome.events.push(MonitorEvent::RiskTagUpdated {
                        customer_id: result.customer_id.clone(),
                        tag: risk_tag(result.risk_level),
                        ok: false,
                    });
                    continue;
                }

                let tag_ok = match tagger.update_risk_tag(&result.customer_id, result.risk_level, result.churn_probability) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("monitor: tag update failed for {}: {e}", result.customer_id);
                        false
                    }
                };
                outcome.events.push(MonitorEvent::RiskTagUpdated {
                    customer_id: result.customer_id.clone(),
                    tag: risk_tag(result.risk_level),
                    ok: tag_ok,
                });

                if result.risk_level != RiskLevel::High {
                    continue;
                }
                let started = match tagger.trigger_retention(&result.customer_id) {
                    Ok(started) => started,
                    Err(e) => {
                        log::warn!("monitor: retention trigger failed for {}: {e}", result.customer_id);
                        false
                    }
                };
                result.retention_triggered = started;
                outcome.events.push(MonitorEvent::RetentionTriggered {
                    customer_id: result.customer_id.clone(),
                    ok: started,
                });
            }
        }

        let flagged = high_risk(&outcome.results);
        if flagged.is_empty() {
            return;
        }
        let delivered = notifier.notify_high_risk(&flagged).unwrap_or_else(|e| {
            log::warn!("monitor: alert delivery failed: {e}");
            false
        });
        outcome.events.push(MonitorEvent::AlertSent {
            high_risk_count: flagged.len(),
            delivered,
        });
    }
}
