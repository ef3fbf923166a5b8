//! Additive permission grants.
//!
//! A grant authorizes one unit's execution identity to perform a bounded
//! set of actions against a bounded set of resources. Grants are
//! allow-only and additive; there is deliberately no API for revoking or
//! narrowing an existing grant — the composed graph is immutable once
//! declared.

use serde::{Deserialize, Serialize};

/// Grant effect. Only `Allow` exists; deny rules are not part of this model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    #[default]
    Allow,
}

/// One authorization statement: principal → actions → resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// Execution identity of the unit receiving access.
    pub principal: String,
    /// Action verbs, sorted and deduplicated.
    pub actions: Vec<String>,
    /// Exact resource identifiers. A trailing-wildcard entry is legal only
    /// for path-prefixed namespaces (secret trees), never as a default.
    pub resources: Vec<String>,
    pub effect: Effect,
}

impl Grant {
    pub fn allow(principal: &str, actions: &[&str], resources: &[String]) -> Self {
        let mut actions: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
        actions.sort();
        actions.dedup();
        Grant {
            principal: principal.to_string(),
            actions,
            resources: resources.to_vec(),
            effect: Effect::Allow,
        }
    }

    /// True if this grant covers the given action verb.
    pub fn covers_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// True if any resource entry names the given identifier.
    pub fn targets(&self, resource: &str) -> bool {
        self.resources.iter().any(|r| r == resource)
    }
}
