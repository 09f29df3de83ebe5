//! Report settings shared by the analyzers and the CLI.

/// Canonical funnel steps, in order.
pub const FUNNEL_STEPS: [&str; 4] = ["Loaded", "Interact", "Clicks", "Purchase"];

/// Cancellations later than this after creation break the SLA.
pub const DEFAULT_SLA_THRESHOLD_SECS: i64 = 3600;

/// Largest threshold a `chrono::Duration` can hold in whole seconds.
pub const MAX_SLA_THRESHOLD_SECS: i64 = i64::MAX / 1000;

pub const DEFAULT_TOP_INTENTS: usize = 10;

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub funnel_steps: Vec<String>,
    pub top_intents: usize,
    pub sla_threshold_secs: i64,
    pub render_charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            funnel_steps: FUNNEL_STEPS.iter().map(|s| s.to_string()).collect(),
            top_intents: DEFAULT_TOP_INTENTS,
            sla_threshold_secs: DEFAULT_SLA_THRESHOLD_SECS,
            render_charts: true,
        }
    }
}

impl ReportConfig {
    /// Position of `name` in the funnel, or `None` for non-funnel events
    pub fn step_index(&self, name: &str) -> Option<usize> {
        self.funnel_steps.iter().position(|s| s == name)
    }
}
