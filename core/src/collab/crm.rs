use super::{http, risk_tag, RecordSource, RiskTagger};
use crate::{
    config::CrmConfig,
    error::MonitorResult,
    extract::RawRecord,
    scorer::RiskLevel,
    types::SourceKind,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Deserialize)]
struct ContactsPage {
    #[serde(default)]
    contacts: Vec<Value>,
}

/// CRM client: contact fetch, risk tagging, and retention workflow trigger.
pub struct CrmClient {
    config: CrmConfig,
    agent:  ureq::Agent,
}

impl CrmClient {
    pub fn new(config: CrmConfig, timeout: Duration) -> Self {
        Self { config, agent: http::make_agent(timeout) }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn auth(&self) -> String {
        http::bearer(&self.config.api_key)
    }

    pub fn fetch_contacts(&self) -> MonitorResult<Vec<Value>> {
        http::require_key(&self.config.api_key, "crm.api_key")?;
        let endpoint = self.url("contacts");

        let response = self
            .agent
            .get(&endpoint)
            .query("locationId", &self.config.location_id)
            .header("Authorization", &self.auth())
            .header("Content-Type", "application/json")
            .call()?;
        let page: ContactsPage = http::ensure_success(response, &endpoint)?
            .into_body()
            .read_json()?;

        Ok(page.contacts)
    }
}

/// Contact resource path with the id percent-encoded as one segment.
pub fn contact_path(customer_id: &str) -> String {
    format!("contacts/{}", urlencoding::encode(customer_id))
}

/// Body for replacing a contact's churn tag. Only the new tag is sent, so
/// any earlier `churn-risk-*` tag is dropped.
pub fn tag_update_body(level: RiskLevel, churn_probability_pct: f64) -> Value {
    json!({
        "tags": [risk_tag(level)],
        "customFields": [
            { "key": "churn_probability", "value": format!("{churn_probability_pct:.1}") },
            { "key": "churn_risk_level", "value": level.to_string() },
        ],
    })
}

impl RecordSource for CrmClient {
    fn name(&self) -> &'static str { "crm" }

    fn fetch(&self) -> MonitorResult<Vec<RawRecord>> {
        let contacts = self.fetch_contacts()?;
        log::info!("crm: fetched {} contacts", contacts.len());
        Ok(contacts
            .into_iter()
            .map(|body| RawRecord::new(SourceKind::Crm, body))
            .collect())
    }
}

impl RiskTagger for CrmClient {
    fn update_risk_tag(
        &self,
        customer_id: &str,
        level: RiskLevel,
        churn_probability_pct: f64,
    ) -> MonitorResult<()> {
        http::require_key(&self.config.api_key, "crm.api_key")?;
        let endpoint = self.url(&contact_path(customer_id));

        let response = self
            .agent
            .put(&endpoint)
            .header("Authorization", &self.auth())
            .header("Content-Type", "application/json")
            .send_json(tag_update_body(level, churn_probability_pct))?;
        http::ensure_success(response, &endpoint)?;

        log::debug!("crm: tagged {customer_id} as {}", risk_tag(level));
        Ok(())
    }

    fn trigger_retention(&self, customer_id: &str) -> MonitorResult<bool> {
        let Some(workflow_id) = self.config.retention_workflow_id.as_deref() else {
            return Ok(false);
        };
        http::require_key(&self.config.api_key, "crm.api_key")?;
        let endpoint = self.url("workflows/trigger");

        let response = self
            .agent
            .post(&endpoint)
            .header("Authorization", &self.auth())
            .header("Content-Type", "application/json")
            .send_json(json!({ "workflowId": workflow_id, "contactId": customer_id }))?;
        http::ensure_success(response, &endpoint)?;

        log::debug!("crm: retention workflow {workflow_id} started for {customer_id}");
        Ok(true)
    }
}
