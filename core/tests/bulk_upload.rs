//! Bulk CSV upload in, scored CSV export out.

use chrono::{DateTime, Utc};
use churnwatch_core::{
    collab::{bulk::TEMPLATE_HEADER, BulkCsvSource, RecordSource},
    config::MonitorConfig,
    extract::{identify, parse_timestamp},
    monitor::ChurnMonitor,
    report::{write_results_csv, RESULTS_CSV_HEADER},
    scorer::RiskLevel,
    types::SourceKind,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn eval_time() -> DateTime<Utc> {
    parse_timestamp("2024-06-01T00:00:00Z").unwrap()
}

fn template_csv() -> String {
    [
        TEMPLATE_HEADER.join(","),
        "1,John Doe,john@example.com,6,79,12,75,0,Credit card,1,Monthly,3".to_string(),
        "2,Jane Smith,jane@example.com,2,49,3,20,1,PayPal,4,Monthly,15".to_string(),
    ]
    .join("\n")
}

// ── Upload ───────────────────────────────────────────────────────────────────

#[test]
fn template_rows_become_prediction_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("customers.csv");
    std::fs::write(&input, template_csv()).unwrap();

    let records = BulkCsvSource::new(&input).fetch().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.source == SourceKind::PredictionApi));
    assert_eq!(identify(&records[1]).customer_id, "2");
    assert_eq!(identify(&records[1]).email, "jane@example.com");

    let outcome = ChurnMonitor::new("csv-test".into(), MonitorConfig::default_test())
        .evaluate(&records, eval_time());

    let john = &outcome.results[0];
    assert_eq!(john.churn_probability, 15.0, "only the monthly contract rule fires");
    assert_eq!(john.risk_level, RiskLevel::Low);

    let jane = &outcome.results[1];
    assert_eq!(jane.churn_probability, 100.0, "six rules fire, sum clamps to 1");
    assert_eq!(jane.risk_level, RiskLevel::High);
}

#[test]
fn missing_ids_and_blank_cells() {
    let content = "name,email,loginFrequency,contractType\n\
                   Ann,ann@example.com,,Annual\n\
                   ,,,\n\
                   Bob,bob@example.com,20,\n";

    let records = BulkCsvSource::parse(content).unwrap();
    assert_eq!(records.len(), 2, "an all-blank row is dropped");
    assert_eq!(identify(&records[0]).customer_id, "customer-1");
    assert_eq!(identify(&records[1]).customer_id, "customer-3", "row numbers count blank rows");
    assert!(records[0].body.get("loginFrequency").is_none(), "blank cell left out");
}

#[test]
fn header_only_file_has_no_records() {
    let records = BulkCsvSource::parse(&TEMPLATE_HEADER.join(",")).unwrap();
    assert!(records.is_empty());
}

// ── Export ───────────────────────────────────────────────────────────────────

#[test]
fn results_export_lists_top_three_factors() {
    let records = BulkCsvSource::parse(&template_csv()).unwrap();
    let outcome = ChurnMonitor::new("csv-test".into(), MonitorConfig::default_test())
        .evaluate(&records, eval_time());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("scored.csv");
    write_results_csv(&outcome.results, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, RESULTS_CSV_HEADER);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);

    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][2], "15.0");
    assert_eq!(&rows[0][3], "Low");
    assert_eq!(&rows[0][4], "Monthly Contract");
    assert_eq!(&rows[0][5], "", "fewer than three factors leaves cells empty");

    assert_eq!(&rows[1][1], "jane@example.com");
    assert_eq!(&rows[1][2], "100.0");
    assert_eq!(&rows[1][3], "High");
    assert_eq!(&rows[1][4], "Failed Payments");
    assert_eq!(&rows[1][5], "Low Login Frequency");
    assert_eq!(&rows[1][6], "High Inactivity");
}
