use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Interaction event, one per row of the events file
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub user_id: Option<String>,
    pub device: String,
    pub event_name: String,
    pub timestamp: Option<String>,
}

/// Chat message, reduced to the field the report uses
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub detected_intent: Option<String>,
}

/// Order with parsed timestamps; unparseable values are `None`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub created_at: Option<NaiveDateTime>,
    pub canceled_at: Option<NaiveDateTime>,
}

/// Users reaching one funnel step on one device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStep {
    pub step: String,
    pub users: u64,
    pub conv_from_prev_pct: f64,
    pub conv_from_start_pct: f64,
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentSummary {
    pub intent: String,
    pub count: u64,
    pub pct_of_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationSla {
    pub total_orders: u64,
    pub canceled: u64,
    pub violations: u64,
    pub violation_rate_pct: f64,
}

/// Full report as written to `report.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub funnel: Vec<FunnelStep>,
    pub intents: Vec<IntentSummary>,
    /// Skipped stage serializes as `{}`
    #[serde(serialize_with = "object_or_empty")]
    pub cancellation_sla: Option<CancellationSla>,
}

fn object_or_empty<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    use serde::ser::SerializeMap;

    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skipped_sla_is_empty_object() {
        let report = Report {
            funnel: vec![],
            intents: vec![],
            cancellation_sla: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({"funnel": [], "intents": [], "cancellation_sla": {}})
        );
    }

    #[test]
    fn test_report_field_names() {
        let report = Report {
            funnel: vec![FunnelStep {
                step: "Loaded".into(),
                users: 2,
                conv_from_prev_pct: 100.0,
                conv_from_start_pct: 100.0,
                device: "mobile".into(),
            }],
            intents: vec![IntentSummary {
                intent: "refund".into(),
                count: 2,
                pct_of_total: 100.0,
            }],
            cancellation_sla: Some(CancellationSla {
                total_orders: 3,
                canceled: 2,
                violations: 1,
                violation_rate_pct: 33.33,
            }),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["funnel"][0]["conv_from_prev_pct"], json!(100.0));
        assert_eq!(value["funnel"][0]["device"], json!("mobile"));
        assert_eq!(value["intents"][0]["pct_of_total"], json!(100.0));
        assert_eq!(value["cancellation_sla"]["violation_rate_pct"], json!(33.33));
        assert_eq!(value["cancellation_sla"]["total_orders"], json!(3));
    }
}
