//! Flow configuration

use serde::{Deserialize, Serialize};

/// Consecutive denials after which the flow escalates to the settings stage
/// instead of the rationale stage
pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 2;

/// Configuration for the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Denials needed before escalating to settings
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u32,

    /// Include the per-item grant map in denied outcomes
    #[serde(default = "default_true")]
    pub report_per_item: bool,
}

fn default_escalation_threshold() -> u32 {
    DEFAULT_ESCALATION_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            report_per_item: true,
        }
    }
}

impl FlowConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the escalation threshold
    pub fn with_escalation_threshold(mut self, threshold: u32) -> Self {
        self.escalation_threshold = threshold;
        self
    }

    /// Enable or disable per-item grant reporting in outcomes
    pub fn with_per_item_reporting(mut self, enabled: bool) -> Self {
        self.report_per_item = enabled;
        self
    }
}
