//! Conditional-creation guards.
//!
//! Optional attachments (firewall association, private-network path,
//! auto-approval invoke grant) are controlled by a tri-state evaluated
//! exactly once at composition time. An absent enabling input must
//! degrade to "no resource", never to a composition failure.

use serde::{Deserialize, Serialize};

/// Tri-state for a conditionally created resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Enabling input missing; the resource is not declared at all.
    Absent,
    /// Declared but switched off; the topology keeps its shape.
    Disabled,
    /// Declared and active.
    Enabled,
}

impl Guard {
    /// Guard on an optional string input. Missing or empty means absent.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => Guard::Enabled,
            _ => Guard::Absent,
        }
    }

    /// Guard on a boolean toggle over an always-declared resource. The
    /// rule exists either way; the flag only flips its active state.
    pub fn from_toggle(enabled: bool) -> Self {
        if enabled { Guard::Enabled } else { Guard::Disabled }
    }

    /// Whether the guarded resource appears in the manifest at all.
    pub fn is_present(&self) -> bool {
        !matches!(self, Guard::Absent)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Guard::Enabled)
    }
}
