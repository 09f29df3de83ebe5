//! Report assembly and output.

use crate::charts;
use crate::config::ReportConfig;
use crate::funnel;
use crate::intents;
use crate::loader::Inputs;
use crate::models::Report;
use crate::sla;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const REPORT_FILE: &str = "report.json";
pub const FUNNEL_CHART_FILE: &str = "funnel.png";
pub const INTENT_CHART_FILE: &str = "intents.png";

/// Run the three analyzers. A stage whose columns are missing logs a
/// warning and contributes an empty section.
pub fn build_report(inputs: &Inputs, config: &ReportConfig) -> Report {
    let funnel = match funnel::extract_events(&inputs.events) {
        Ok(events) => funnel::analyze_funnel(&events, config),
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    };

    let intents = match intents::extract_messages(&inputs.messages) {
        Ok(messages) => intents::analyze_intents(&messages),
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    };

    let cancellation_sla = match sla::extract_orders(&inputs.orders) {
        Ok(orders) => Some(sla::analyze_cancellations(&orders, config.sla_threshold_secs)),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    info!(
        "Analyzed {} funnel steps, {} intents, SLA {}",
        funnel.len(),
        intents.len(),
        if cancellation_sla.is_some() { "computed" } else { "skipped" }
    );

    Report {
        funnel,
        intents,
        cancellation_sla,
    }
}

/// Render whichever charts have data. Failures are logged, not returned.
pub fn render_charts(report: &Report, out_dir: &Path, config: &ReportConfig) {
    if !report.funnel.is_empty() {
        let path = out_dir.join(FUNNEL_CHART_FILE);
        if let Err(e) = charts::render_funnel_chart(&report.funnel, &config.funnel_steps, &path) {
            warn!("Failed to render {}: {:#}", path.display(), e);
        }
    }

    if !report.intents.is_empty() {
        let path = out_dir.join(INTENT_CHART_FILE);
        let title = format!("Top {} Intents", config.top_intents);
        let top = intents::top_n(&report.intents, config.top_intents);
        if let Err(e) = charts::render_intent_chart(top, &title, &path) {
            warn!("Failed to render {}: {:#}", path.display(), e);
        }
    }
}

pub fn write_report(report: &Report, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Report saved to {}", path.display());
    Ok(path)
}

/// Analyze, then write charts and `report.json` into `out_dir`.
pub fn run(inputs: &Inputs, out_dir: &Path, config: &ReportConfig) -> Result<Report> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let report = build_report(inputs, config);
    if config.render_charts {
        render_charts(&report, out_dir, config);
    }
    write_report(&report, out_dir)?;
    Ok(report)
}

pub fn summary_lines(report: &Report, out_dir: &Path) -> Vec<String> {
    let mut lines = vec![
        "Report generated".to_string(),
        format!("- Funnel steps: {}", report.funnel.len()),
        format!("- Intents found: {}", report.intents.len()),
    ];
    if let Some(sla) = &report.cancellation_sla {
        lines.push(format!(
            "- Cancellation SLA violation rate: {:?}%",
            sla.violation_rate_pct
        ));
    }
    lines.push(format!("Output saved in: {}", out_dir.display()));
    lines
}

pub fn print_summary(report: &Report, out_dir: &Path) {
    for line in summary_lines(report, out_dir) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::table_from_str;

    fn inputs(events: &str, messages: &str, orders: &str) -> Inputs {
        Inputs {
            events: table_from_str("events.csv", events),
            messages: table_from_str("messages.csv", messages),
            orders: table_from_str("orders.csv", orders),
        }
    }

    fn sample_inputs() -> Inputs {
        inputs(
            "user_id,device,event_name\nu1,mobile,Loaded\nu2,mobile,Loaded\nu1,mobile,Purchase\n",
            "detected_intent\n\"\"\nrefund\nrefund\n",
            "created_at,canceled_at\n\
             2024-03-01 10:00:00,2024-03-01 10:30:00\n\
             2024-03-01 10:00:00,2024-03-01 12:00:00\n\
             2024-03-01 10:00:00,\n",
        )
    }

    fn no_charts() -> ReportConfig {
        ReportConfig {
            render_charts: false,
            ..ReportConfig::default()
        }
    }

    #[test]
    fn test_build_full_report() {
        let report = build_report(&sample_inputs(), &ReportConfig::default());

        assert_eq!(report.funnel.len(), 2);
        assert_eq!(report.intents[0].intent, "refund");
        assert_eq!(report.intents[1].intent, "unknown");
        let sla = report.cancellation_sla.unwrap();
        assert_eq!(sla.violations, 1);
        assert_eq!(sla.violation_rate_pct, 33.33);
    }

    #[test]
    fn test_missing_columns_degrade_each_stage() {
        let report = build_report(
            &inputs("user_id,event_name\nu1,Loaded\n", "text\nhi\n", "created_at\n2024-03-01\n"),
            &ReportConfig::default(),
        );
        assert!(report.funnel.is_empty());
        assert!(report.intents.is_empty());
        assert!(report.cancellation_sla.is_none());
    }

    #[test]
    fn test_run_writes_report_into_new_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");

        run(&sample_inputs(), &out, &no_charts()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(REPORT_FILE)).unwrap()).unwrap();
        assert_eq!(written["funnel"][1]["conv_from_start_pct"], 50.0);
        assert_eq!(written["intents"][0]["pct_of_total"], 66.67);
        assert_eq!(written["cancellation_sla"]["total_orders"], 3);
        assert!(!out.join(FUNNEL_CHART_FILE).exists());
    }

    #[test]
    fn test_run_with_missing_event_columns_still_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = sample_inputs();
        data.events = table_from_str("events.csv", "user_id,device\nu1,web\n");

        let report = run(&data, dir.path(), &no_charts()).unwrap();
        assert!(report.funnel.is_empty());

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap())
                .unwrap();
        assert_eq!(written["funnel"], serde_json::json!([]));
        assert_eq!(written["intents"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_run_with_charts_writes_both_pngs() {
        let dir = tempfile::tempdir().unwrap();
        run(&sample_inputs(), dir.path(), &ReportConfig::default()).unwrap();

        assert!(dir.path().join(REPORT_FILE).exists());
        assert!(dir.path().join(FUNNEL_CHART_FILE).exists());
        assert!(dir.path().join(INTENT_CHART_FILE).exists());
    }

    #[test]
    fn test_no_funnel_chart_without_event_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = sample_inputs();
        data.events = table_from_str("events.csv", "user_id,device\nu1,web\n");

        run(&data, dir.path(), &ReportConfig::default()).unwrap();

        assert!(dir.path().join(REPORT_FILE).exists());
        assert!(!dir.path().join(FUNNEL_CHART_FILE).exists());
        assert!(dir.path().join(INTENT_CHART_FILE).exists());
    }

    #[test]
    fn test_no_intent_chart_without_intent_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = sample_inputs();
        data.messages = table_from_str("messages.csv", "message_id,text\n1,hello\n");

        run(&data, dir.path(), &ReportConfig::default()).unwrap();

        assert!(dir.path().join(REPORT_FILE).exists());
        assert!(dir.path().join(FUNNEL_CHART_FILE).exists());
        assert!(!dir.path().join(INTENT_CHART_FILE).exists());
    }

    #[test]
    fn test_end_to_end_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("events.csv");
        let messages = dir.path().join("messages.csv");
        let orders = dir.path().join("orders.csv");
        fs::write(
            &events,
            "user_id,device,event_name,timestamp\n\
             u1,web,Loaded,2024-03-01 09:00:00\n\
             u2,web,Loaded,2024-03-01 09:01:00\n\
             u1,web,Interact,2024-03-01 09:02:00\n\
             u3,mobile,Loaded,2024-03-01 09:03:00\n",
        )
        .unwrap();
        fs::write(&messages, "message_id,detected_intent\n1,refund\n2,NaN\n").unwrap();
        fs::write(&orders, "order_id,created_at,canceled_at\n1,2024-03-01 09:00:00,\n").unwrap();

        let data = Inputs::load(&events, &messages, &orders).unwrap();
        let report = run(&data, &dir.path().join("out"), &no_charts()).unwrap();

        let devices: Vec<_> = report.funnel.iter().map(|s| s.device.as_str()).collect();
        assert_eq!(devices, vec!["mobile", "web", "web"]);
        assert_eq!(report.funnel[2].conv_from_prev_pct, 50.0);
        assert_eq!(report.intents.len(), 2);
        assert_eq!(report.cancellation_sla.unwrap().violation_rate_pct, 0.0);
    }

    #[test]
    fn test_unreadable_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("events.csv");
        fs::write(&present, "user_id,device,event_name\n").unwrap();

        let result = Inputs::load(&present, &dir.path().join("missing.csv"), &present);
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_lines() {
        let report = build_report(&sample_inputs(), &ReportConfig::default());
        let lines = summary_lines(&report, Path::new("out"));
        assert_eq!(
            lines,
            vec![
                "Report generated",
                "- Funnel steps: 2",
                "- Intents found: 2",
                "- Cancellation SLA violation rate: 33.33%",
                "Output saved in: out",
            ]
        );
    }

    #[test]
    fn test_summary_keeps_decimal_on_whole_rates() {
        let mut report = build_report(&sample_inputs(), &ReportConfig::default());
        for rate in [50.0, 0.0] {
            if let Some(sla) = report.cancellation_sla.as_mut() {
                sla.violation_rate_pct = rate;
            }
            let lines = summary_lines(&report, Path::new("out"));
            assert_eq!(lines[3], format!("- Cancellation SLA violation rate: {:.1}%", rate));
        }
    }

    #[test]
    fn test_summary_without_sla() {
        let report = Report {
            funnel: vec![],
            intents: vec![],
            cancellation_sla: None,
        };
        let lines = summary_lines(&report, Path::new("out"));
        assert_eq!(lines.len(), 4);
        assert!(!lines.iter().any(|l| l.contains("SLA")));
    }
}
