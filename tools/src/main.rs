//! monitor-runner: batch churn monitoring and the line-oriented prediction API.
//!
//! Usage:
//!   monitor-runner --source crm --config monitor.json
//!   monitor-runner --source membership --config monitor.json --at 2024-06-01T00:00:00Z
//!   monitor-runner --source file --input contacts.json --kind crm --no-side-effects
//!   monitor-runner --source file --input customers.csv --csv-out scored.csv --no-side-effects
//!   monitor-runner --stdin-mode

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use churnwatch_core::{
    alert::SlackNotifier,
    collab::{BulkCsvSource, CrmClient, JsonFileSource, MembershipClient, RecordSource, RiskTagger},
    config::MonitorConfig,
    extract::{parse_timestamp, Extractor},
    monitor::{new_run_id, ChurnMonitor},
    predict::respond,
    report::{render_daily_report, write_results_csv, ChurnReport},
    types::SourceKind,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let stdin_mode = args.iter().any(|a| a == "--stdin-mode");
    let no_side_effects = args.iter().any(|a| a == "--no-side-effects");
    let source = flag_value(&args, "--source").unwrap_or("file");
    let kind = flag_value(&args, "--kind").unwrap_or("prediction_api");
    let input = flag_value(&args, "--input");
    let csv_out = flag_value(&args, "--csv-out");

    let mut config = match flag_value(&args, "--config") {
        Some(path) => MonitorConfig::load(path)?,
        None => {
            let mut config = MonitorConfig::default();
            config.apply_env_overrides(|key| env::var(key).ok());
            config
        }
    };
    if let Some(dir) = flag_value(&args, "--reports-dir") {
        config.reports.output_dir = dir.to_string();
    }

    let evaluation_time = match flag_value(&args, "--at") {
        Some(raw) => match parse_timestamp(raw) {
            Some(at) => at,
            None => bail!("--at: cannot parse '{raw}' as an ISO-8601 timestamp"),
        },
        None => Utc::now(),
    };

    if stdin_mode {
        return run_stdin_loop(&config, evaluation_time);
    }

    let timeout = config.http_timeout();
    let crm = CrmClient::new(config.crm.clone(), timeout);
    let membership = MembershipClient::new(config.membership.clone(), timeout);

    let file_source;
    let csv_source;
    let records_from: &dyn RecordSource = match source {
        "crm" => &crm,
        "membership" => &membership,
        "file" => {
            let Some(path) = input else {
                bail!("--source file requires --input <path>");
            };
            if path.to_ascii_lowercase().ends_with(".csv") {
                csv_source = BulkCsvSource::new(path);
                &csv_source
            } else {
                let Some(kind) = SourceKind::parse(kind) else {
                    bail!("--kind: unknown source kind '{kind}'");
                };
                file_source = JsonFileSource::new(path, kind);
                &file_source
            }
        }
        other => bail!("--source: unknown source '{other}' (expected crm, membership, file)"),
    };

    let run_id = new_run_id();
    println!("churn monitor: monitor-runner");
    println!("  run_id:    {run_id}");
    println!("  source:    {}", records_from.name());
    println!("  evaluated: {}", evaluation_time.to_rfc3339());
    println!();

    let records = records_from.fetch()?;
    if records.is_empty() {
        println!("No customer data available");
        return Ok(());
    }

    let monitor = ChurnMonitor::new(run_id.clone(), config.clone());
    let mut outcome = monitor.evaluate(&records, evaluation_time);

    if no_side_effects {
        log::info!("run={run_id} side effects disabled");
    } else {
        let notifier = SlackNotifier::new(config.alerts.clone(), timeout);
        let tagger: Option<&dyn RiskTagger> = (source == "crm").then_some(&crm as &dyn RiskTagger);
        monitor.dispatch(&mut outcome, tagger, &notifier);
    }

    let generated_at = Utc::now();
    println!("{}", render_daily_report(&outcome.results, generated_at, config.reports.top_n));

    if let Some(path) = csv_out {
        write_results_csv(&outcome.results, Path::new(path))?;
        println!("Results exported to {path}");
    }

    let report = ChurnReport::new(run_id, generated_at, outcome.results);
    let path = report.write_to(Path::new(&config.reports.output_dir))?;
    println!("Report saved to {}", path.display());

    Ok(())
}

/// One JSON object per input line, one response per output line.
/// Malformed or non-object lines get an `{"error": ...}` response; the
/// loop continues.
fn run_stdin_loop(config: &MonitorConfig, evaluation_time: DateTime<Utc>) -> Result<()> {
    let extractor = Extractor::new(config.defaults.clone());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let response = respond(&buffer, &extractor, evaluation_time);
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
