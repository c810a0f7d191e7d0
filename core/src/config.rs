use crate::extract::ExtractionDefaults;
use serde::{Deserialize, Serialize};

// ── Collaborator endpoints ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrmConfig {
    pub base_url: String,
    pub api_key: String,
    pub location_id: String,
    /// Workflow started for high-risk contacts. Unset disables the trigger.
    pub retention_workflow_id: Option<String>,
    /// Contacts without this tag are not evaluated.
    pub active_tag: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://rest.gohighlevel.com/v1".into(),
            api_key: String::new(),
            location_id: String::new(),
            retention_workflow_id: None,
            active_tag: "active-subscriber".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MembershipConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.whop.com/api/v2".into(),
            api_key: String::new(),
        }
    }
}

// ── Outputs ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    /// Incoming-webhook URL. Unset means alerts are skipped.
    pub slack_webhook_url: Option<String>,
    /// High-risk customers listed in one alert.
    pub top_n: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { slack_webhook_url: None, top_n: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: String,
    /// High-risk customers listed in the text report.
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { output_dir: "reports".into(), top_n: 10 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    pub crm: CrmConfig,
    pub membership: MembershipConfig,
    pub alerts: AlertConfig,
    pub reports: ReportConfig,
    pub defaults: ExtractionDefaults,
    pub http_timeout_secs: u64,
}

impl MonitorConfig {
    /// Load from a JSON file, then apply secret overrides from the
    /// process environment.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let mut config: MonitorConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Secrets never live in checked-in config; the environment wins when set.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("CRM_API_KEY") {
            self.crm.api_key = key;
        }
        if let Some(location) = non_empty("CRM_LOCATION_ID") {
            self.crm.location_id = location;
        }
        if let Some(key) = non_empty("MEMBERSHIP_API_KEY") {
            self.membership.api_key = key;
        }
        if let Some(url) = non_empty("SLACK_WEBHOOK_URL") {
            self.alerts.slack_webhook_url = Some(url);
        }
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        let secs = if self.http_timeout_secs == 0 { 30 } else { self.http_timeout_secs };
        std::time::Duration::from_secs(secs)
    }

    /// Config with hardcoded values for use in tests.
    pub fn default_test() -> Self {
        Self {
            crm: CrmConfig {
                base_url: "http://127.0.0.1:9/v1".into(),
                api_key: "test-crm-key".into(),
                location_id: "loc-test".into(),
                retention_workflow_id: Some("wf-retention".into()),
                active_tag: "active-subscriber".into(),
            },
            membership: MembershipConfig {
                base_url: "http://127.0.0.1:9/api/v2".into(),
                api_key: "test-membership-key".into(),
            },
            alerts: AlertConfig { slack_webhook_url: None, top_n: 5 },
            reports: ReportConfig { output_dir: "reports".into(), top_n: 10 },
            defaults: ExtractionDefaults::default(),
            http_timeout_secs: 5,
        }
    }
}
