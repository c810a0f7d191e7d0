//! High-risk alerting.

use crate::{
    collab::http,
    config::AlertConfig,
    error::MonitorResult,
    report::{display_name, ScoredCustomer},
};
use serde_json::{json, Value};
use std::time::Duration;

pub trait Notifier {
    /// Returns `Ok(false)` when the notifier is not configured to deliver.
    fn notify_high_risk(&self, customers: &[&ScoredCustomer]) -> MonitorResult<bool>;
}

/// Slack block-kit message listing the first `top_n` customers.
pub fn build_slack_message(customers: &[&ScoredCustomer], top_n: usize) -> Value {
    let count = customers.len();
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": "High Churn Risk Alert" },
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*{count} customers* are at high risk of churning:"),
            },
        }),
    ];
    blocks.extend(customers.iter().take(top_n).map(|c| {
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("• *{}*: {:.1}% risk", display_name(c), c.churn_probability),
            },
        })
    }));

    json!({
        "text": format!(":warning: *Churn Alert*: {count} high-risk customers detected"),
        "blocks": blocks,
    })
}

pub struct SlackNotifier {
    webhook_url: Option<String>,
    top_n:       usize,
    agent:       ureq::Agent,
}

impl SlackNotifier {
    pub fn new(config: AlertConfig, timeout: Duration) -> Self {
        Self {
            webhook_url: config.slack_webhook_url.filter(|u| !u.trim().is_empty()),
            top_n: config.top_n,
            agent: http::make_agent(timeout),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

impl Notifier for SlackNotifier {
    fn notify_high_risk(&self, customers: &[&ScoredCustomer]) -> MonitorResult<bool> {
        let Some(url) = self.webhook_url.as_deref() else {
            log::debug!("alert: no webhook configured, skipping");
            return Ok(false);
        };
        if customers.is_empty() {
            return Ok(false);
        }

        let response = self
            .agent
            .post(url)
            .send_json(build_slack_message(customers, self.top_n))?;
        http::ensure_success(response, "slack webhook")?;

        log::info!("alert: slack notified of {} high-risk customers", customers.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scorer::RiskLevel, types::SourceKind};

    fn customer(i: usize) -> ScoredCustomer {
        ScoredCustomer {
            customer_id:         format!("c-{i}"),
            email:               format!("user{i}@example.com"),
            source:              SourceKind::Crm,
            churn_probability:   90.0,
            risk_level:          RiskLevel::High,
            risk_factors:        vec![],
            retention_triggered: false,
        }
    }

    #[test]
    fn message_lists_at_most_top_n_customers() {
        let owned: Vec<_> = (0..8).map(customer).collect();
        let refs: Vec<_> = owned.iter().collect();

        let msg = build_slack_message(&refs, 5);
        let blocks = msg["blocks"].as_array().unwrap();

        // header + summary + 5 customers
        assert_eq!(blocks.len(), 7);
        assert!(msg["text"].as_str().unwrap().contains("8 high-risk"));
        assert!(blocks[2]["text"]["text"].as_str().unwrap().contains("user0@example.com"));
    }

    #[test]
    fn unconfigured_notifier_does_not_deliver() {
        let notifier = SlackNotifier::new(AlertConfig::default(), Duration::from_secs(1));
        let owned = customer(1);
        assert!(!notifier.is_configured());
        assert!(!notifier.notify_high_risk(&[&owned]).unwrap());
    }
}
