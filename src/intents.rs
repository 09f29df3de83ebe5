//! Intent frequency ranking.

use crate::error::MissingColumns;
use crate::loader::Table;
use crate::models::{IntentSummary, MessageRecord};
use crate::stats::pct;
use std::collections::HashMap;

pub const INTENT_COLUMN: &str = "detected_intent";

/// Label used for messages without a detected intent
pub const UNKNOWN_INTENT: &str = "unknown";

pub fn extract_messages(table: &Table) -> Result<Vec<MessageRecord>, MissingColumns> {
    let col = table.require(&[INTENT_COLUMN])?[0];
    Ok(table
        .values(col)
        .map(|v| MessageRecord {
            detected_intent: v.map(str::to_string),
        })
        .collect())
}

/// Count messages per intent, most frequent first.
///
/// Ties keep the order in which intents first appear.
pub fn analyze_intents(messages: &[MessageRecord]) -> Vec<IntentSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();

    for message in messages {
        let intent = message.detected_intent.as_deref().unwrap_or(UNKNOWN_INTENT);
        let count = counts.entry(intent).or_insert_with(|| {
            order.push(intent);
            0
        });
        *count += 1;
    }

    let total = messages.len() as u64;
    let mut ranked: Vec<IntentSummary> = order
        .into_iter()
        .map(|intent| {
            let count = counts[intent];
            IntentSummary {
                intent: intent.to_string(),
                count,
                pct_of_total: pct(count, total),
            }
        })
        .collect();

    // stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// Leading `n` entries of a ranking
pub fn top_n(ranked: &[IntentSummary], n: usize) -> &[IntentSummary] {
    &ranked[..ranked.len().min(n)]
}
