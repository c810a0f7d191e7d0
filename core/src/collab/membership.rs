use super::{http, RecordSource};
use crate::{
    config::MembershipConfig,
    error::MonitorResult,
    extract::RawRecord,
    types::SourceKind,
};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Deserialize)]
struct MembershipPage {
    #[serde(default)]
    data: Vec<Value>,
}

/// Membership-platform client. Fetches active memberships only.
pub struct MembershipClient {
    config: MembershipConfig,
    agent:  ureq::Agent,
}

impl MembershipClient {
    pub fn new(config: MembershipConfig, timeout: Duration) -> Self {
        Self { config, agent: http::make_agent(timeout) }
    }

    pub fn fetch_active(&self) -> MonitorResult<Vec<Value>> {
        http::require_key(&self.config.api_key, "membership.api_key")?;
        let endpoint = format!("{}/memberships", self.config.base_url.trim_end_matches('/'));

        let response = self
            .agent
            .get(&endpoint)
            .query("status", "active")
            .header("Authorization", &http::bearer(&self.config.api_key))
            .header("Content-Type", "application/json")
            .call()?;
        let page: MembershipPage = http::ensure_success(response, &endpoint)?
            .into_body()
            .read_json()?;

        Ok(page.data)
    }
}

impl RecordSource for MembershipClient {
    fn name(&self) -> &'static str { "membership" }

    fn fetch(&self) -> MonitorResult<Vec<RawRecord>> {
        let memberships = self.fetch_active()?;
        log::info!("membership: fetched {} active memberships", memberships.len());
        Ok(memberships
            .into_iter()
            .map(|body| RawRecord::new(SourceKind::Membership, body))
            .collect())
    }
}
