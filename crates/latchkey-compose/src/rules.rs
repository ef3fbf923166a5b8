//! Event rules, schedule rules, and conditional associations.

use serde::{Deserialize, Serialize};

use latchkey_core::Schedule;

/// Subscription of a function to the shared event channel.
///
/// The filter is an exact match on the channel's source tag — a
/// subscriber receives every event published with that tag and
/// discriminates event kinds internally. Delivery retries a bounded
/// number of times; exhaustion surfaces in the target's own failure
/// telemetry, not at composition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRule {
    pub id: String,
    pub source_tag: String,
    /// Resource id of the target function.
    pub target: String,
    pub retry_attempts: u32,
}

impl EventRule {
    /// Exact-match source filter, never a pattern.
    pub fn matches_source(&self, tag: &str) -> bool {
        self.source_tag == tag
    }
}

/// Recurrence rule targeting a function.
///
/// Existence and activity are independent: a disabled rule keeps the
/// topology's shape so the same graph can be flipped on without
/// re-declaring anything. The target stays invocable on demand either
/// way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub id: String,
    pub schedule: Schedule,
    pub target: String,
    pub enabled: bool,
}

/// A materialized conditional attachment (firewall → stage, VPC →
/// function). Only present-state guards produce one of these; an absent
/// guard produces nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub id: String,
    /// What the attachment hangs off (e.g. a facade stage).
    pub target: String,
    /// Identifier of the attached resource.
    pub attachment: String,
    pub enabled: bool,
}
