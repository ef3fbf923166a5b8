//! The synthesized deployment manifest.
//!
//! The manifest is the sole product of composition: a frozen, ordered
//! record of every declaration, handed to the external orchestration
//! tool as JSON. Resource order is declaration order, which is already
//! dependency order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use latchkey_core::Grant;

use crate::routes::Route;
use crate::rules::{Association, EventRule, ScheduleRule};
use crate::scope::ResourceDecl;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub deployment: String,
    pub resources: Vec<ResourceDecl>,
    pub routes: Vec<Route>,
    pub grants: Vec<Grant>,
    pub event_rules: Vec<EventRule>,
    pub schedule_rules: Vec<ScheduleRule>,
    pub associations: Vec<Association>,
    pub outputs: BTreeMap<String, String>,
}

impl Manifest {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Grants whose principal is the given unit identity.
    pub fn grants_for(&self, principal: &str) -> Vec<&Grant> {
        self.grants
            .iter()
            .filter(|g| g.principal == principal)
            .collect()
    }

    /// Function resource ids in declaration order.
    pub fn function_ids(&self) -> Vec<&str> {
        self.resources
            .iter()
            .filter_map(|r| match r {
                ResourceDecl::Function { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    #[test]
    fn manifest_serializes_to_json() {
        let mut scope = Scope::new("latchkey");
        scope.set_output("ApiUrl", "${api.url}").unwrap();
        let manifest = scope.synth();

        let json = manifest.to_json_pretty().unwrap();
        assert!(json.contains("\"deployment\": \"latchkey\""));
        assert!(json.contains("${api.url}"));

        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.outputs["ApiUrl"], "${api.url}");
    }
}
