//! Funnel conversion per device.
//!
//! Distinct users are counted per (device, step); only the configured
//! funnel steps are kept, ordered canonically, and each step is compared
//! with the previous present step and with the device's first present step.

use crate::config::ReportConfig;
use crate::error::MissingColumns;
use crate::loader::Table;
use crate::models::{EventRecord, FunnelStep};
use crate::stats::pct;
use std::collections::{BTreeMap, HashSet};

pub const REQUIRED_COLUMNS: [&str; 3] = ["device", "event_name", "user_id"];

/// Pull event records out of the events table.
///
/// Rows without a device or event name cannot be grouped and are dropped.
pub fn extract_events(table: &Table) -> Result<Vec<EventRecord>, MissingColumns> {
    let cols = table.require(&REQUIRED_COLUMNS)?;
    let (device_col, event_col, user_col) = (cols[0], cols[1], cols[2]);
    let ts_col = table.column("timestamp");

    let events = (0..table.len())
        .filter_map(|row| {
            let device = table.cell(row, device_col)?;
            let event_name = table.cell(row, event_col)?;
            Some(EventRecord {
                user_id: table.cell(row, user_col).map(str::to_string),
                device: device.to_string(),
                event_name: event_name.to_string(),
                timestamp: ts_col
                    .and_then(|c| table.cell(row, c))
                    .map(str::to_string),
            })
        })
        .collect();

    Ok(events)
}

/// Compute step results for every device, devices in lexical order.
pub fn analyze_funnel(events: &[EventRecord], config: &ReportConfig) -> Vec<FunnelStep> {
    // device -> step index -> distinct users
    let mut groups: BTreeMap<&str, BTreeMap<usize, HashSet<&str>>> = BTreeMap::new();

    for event in events {
        let Some(step) = config.step_index(&event.event_name) else {
            continue;
        };
        let users = groups
            .entry(event.device.as_str())
            .or_default()
            .entry(step)
            .or_default();
        if let Some(user) = event.user_id.as_deref() {
            users.insert(user);
        }
    }

    let mut results = Vec::new();
    for (device, steps) in &groups {
        let mut counts = steps.iter().map(|(idx, users)| (*idx, users.len() as u64));
        let Some((first_idx, start_users)) = counts.next() else {
            continue;
        };

        results.push(step_result(config, first_idx, device, start_users, start_users, start_users));

        let mut prev_users = start_users;
        for (idx, users) in counts {
            results.push(step_result(config, idx, device, users, prev_users, start_users));
            prev_users = users;
        }
    }

    results
}

fn step_result(
    config: &ReportConfig,
    idx: usize,
    device: &str,
    users: u64,
    prev_users: u64,
    start_users: u64,
) -> FunnelStep {
    FunnelStep {
        step: config.funnel_steps[idx].clone(),
        users,
        conv_from_prev_pct: pct(users, prev_users),
        conv_from_start_pct: pct(users, start_users),
        device: device.to_string(),
    }
}

/// Devices present in a result set, in first-seen order
pub fn devices(steps: &[FunnelStep]) -> Vec<&str> {
    let mut seen = Vec::new();
    for step in steps {
        if !seen.contains(&step.device.as_str()) {
            seen.push(step.device.as_str());
        }
    }
    seen
}
