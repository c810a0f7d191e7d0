use churnwatch_core::{config::MonitorConfig, metrics::PaymentMethod};

#[test]
fn partial_config_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.json");
    std::fs::write(
        &path,
        r#"{
            "crm": { "location_id": "loc-1", "retention_workflow_id": "wf-9" },
            "defaults": { "payment_method": "bank_transfer" }
        }"#,
    )
    .unwrap();

    let config = MonitorConfig::load(path.to_str().unwrap()).unwrap();

    assert_eq!(config.crm.location_id, "loc-1");
    assert_eq!(config.crm.retention_workflow_id.as_deref(), Some("wf-9"));
    assert_eq!(config.crm.active_tag, "active-subscriber");
    assert_eq!(config.alerts.top_n, 5);
    assert_eq!(config.reports.output_dir, "reports");
    assert_eq!(config.defaults.payment_method, PaymentMethod::BankTransfer);
    assert_eq!(config.defaults.days_since_last_activity, 30);
}

#[test]
fn missing_config_file_is_an_error() {
    let err = MonitorConfig::load("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("Cannot read"), "got: {err}");
}

#[test]
fn env_overrides_replace_secrets_only_when_set() {
    let mut config = MonitorConfig::default_test();
    config.apply_env_overrides(|key| match key {
        "CRM_API_KEY" => Some("from-env".into()),
        "SLACK_WEBHOOK_URL" => Some("https://hooks.example.com/x".into()),
        "MEMBERSHIP_API_KEY" => Some("   ".into()),
        _ => None,
    });

    assert_eq!(config.crm.api_key, "from-env");
    assert_eq!(config.alerts.slack_webhook_url.as_deref(), Some("https://hooks.example.com/x"));
    assert_eq!(config.membership.api_key, "test-membership-key", "blank env values are ignored");
    assert_eq!(config.crm.location_id, "loc-test");
}

#[test]
fn zero_timeout_falls_back_to_thirty_seconds() {
    let config = MonitorConfig::default();
    assert_eq!(config.http_timeout().as_secs(), 30);
}
