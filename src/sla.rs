//! Cancellation SLA: how many canceled orders took longer than the
//! threshold to be canceled.

use crate::error::MissingColumns;
use crate::loader::Table;
use crate::models::{CancellationSla, OrderRecord};
use crate::stats::pct;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

pub const REQUIRED_COLUMNS: [&str; 2] = ["created_at", "canceled_at"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a timestamp in any of the accepted layouts.
///
/// Values carrying an offset are normalised to UTC. Anything unparseable
/// is `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn extract_orders(table: &Table) -> Result<Vec<OrderRecord>, MissingColumns> {
    let cols = table.require(&REQUIRED_COLUMNS)?;
    let (created_col, canceled_col) = (cols[0], cols[1]);

    Ok((0..table.len())
        .map(|row| OrderRecord {
            created_at: table.cell(row, created_col).and_then(parse_timestamp),
            canceled_at: table.cell(row, canceled_col).and_then(parse_timestamp),
        })
        .collect())
}

/// Cancellation latency, when both timestamps are known
pub fn cancellation_latency(order: &OrderRecord) -> Option<Duration> {
    match (order.created_at, order.canceled_at) {
        (Some(created), Some(canceled)) => Some(canceled - created),
        _ => None,
    }
}

pub fn analyze_cancellations(orders: &[OrderRecord], threshold_secs: i64) -> CancellationSla {
    // out-of-range thresholds saturate instead of overflowing
    let threshold = Duration::try_seconds(threshold_secs).unwrap_or(if threshold_secs < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    });

    let total_orders = orders.len() as u64;
    let canceled = orders.iter().filter(|o| o.canceled_at.is_some()).count() as u64;
    let violations = orders
        .iter()
        .filter_map(cancellation_latency)
        .filter(|latency| *latency > threshold)
        .count() as u64;

    CancellationSla {
        total_orders,
        canceled,
        violations,
        violation_rate_pct: pct(violations, total_orders),
    }
}
