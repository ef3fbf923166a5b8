//! Declaration scope — the ordered composition graph.
//!
//! A [`Scope`] collects everything one deployment declares: resources,
//! routes, grants, event/schedule rules, conditional associations, and
//! named outputs. Declaration order is preserved; a resource referenced
//! by a later construct must already be in the scope, which keeps
//! dependency ordering correct by construction.
//!
//! Deployment-time values that only exist after the orchestration tool
//! runs (URLs, generated ARNs, role identifiers) are represented as
//! symbolic [`Ref`]s rendered into `${resource.attr}` placeholders.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use latchkey_core::{Grant, Guard, UnitSpec};

use crate::error::{ComposeError, ComposeResult};
use crate::manifest::Manifest;
use crate::routes::{Route, RouteTable};
use crate::rules::{Association, EventRule, ScheduleRule};

/// Symbolic reference to an attribute of a declared resource, resolved
/// by the external orchestration tool after deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub resource: String,
    pub attr: String,
}

impl Ref {
    pub fn new(resource: &str, attr: &str) -> Self {
        Ref {
            resource: resource.to_string(),
            attr: attr.to_string(),
        }
    }

    /// Placeholder form embedded in environment values and outputs.
    pub fn render(&self) -> String {
        format!("${{{}.{}}}", self.resource, self.attr)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceDecl {
    /// The shared multi-tenant table. Singleton.
    Table {
        id: String,
        name: String,
        partition_key: String,
        sort_key: String,
    },
    /// The shared publish/subscribe channel. Singleton.
    EventChannel {
        id: String,
        name: String,
        source_tag: String,
    },
    IdentityPool { id: String, name: String },
    Key { id: String, alias: String },
    Function { id: String, spec: UnitSpec },
    HttpApi { id: String, name: String, stage: String },
    /// Opaque sibling subsystem consumed by reference only.
    Subsystem { id: String, name: String },
}

impl ResourceDecl {
    pub fn id(&self) -> &str {
        match self {
            ResourceDecl::Table { id, .. }
            | ResourceDecl::EventChannel { id, .. }
            | ResourceDecl::IdentityPool { id, .. }
            | ResourceDecl::Key { id, .. }
            | ResourceDecl::Function { id, .. }
            | ResourceDecl::HttpApi { id, .. }
            | ResourceDecl::Subsystem { id, .. } => id,
        }
    }

    /// Singleton kind name, if this resource kind allows only one
    /// instance per deployment.
    fn singleton_kind(&self) -> Option<&'static str> {
        match self {
            ResourceDecl::Table { .. } => Some("shared table"),
            ResourceDecl::EventChannel { .. } => Some("event channel"),
            _ => None,
        }
    }
}

/// The composition graph for one deployment.
pub struct Scope {
    deployment: String,
    resources: Vec<ResourceDecl>,
    ids: BTreeSet<String>,
    singletons: BTreeMap<&'static str, String>,
    routes: RouteTable,
    grants: Vec<Grant>,
    event_rules: Vec<EventRule>,
    schedule_rules: Vec<ScheduleRule>,
    associations: Vec<Association>,
    outputs: BTreeMap<String, String>,
}

impl Scope {
    pub fn new(deployment: &str) -> Self {
        Scope {
            deployment: deployment.to_string(),
            resources: Vec::new(),
            ids: BTreeSet::new(),
            singletons: BTreeMap::new(),
            routes: RouteTable::new(),
            grants: Vec::new(),
            event_rules: Vec::new(),
            schedule_rules: Vec::new(),
            associations: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Declare a resource. Ids must be unique; the shared table and the
    /// event channel additionally allow only one instance each.
    pub fn declare(&mut self, decl: ResourceDecl) -> ComposeResult<()> {
        let id = decl.id().to_string();
        if !self.ids.insert(id.clone()) {
            return Err(ComposeError::DuplicateResource(id));
        }
        if let Some(kind) = decl.singleton_kind() {
            if self.singletons.insert(kind, id.clone()).is_some() {
                return Err(ComposeError::DuplicateSingleton { kind, id });
            }
        }
        debug!(resource = %id, "declared");
        self.resources.push(decl);
        Ok(())
    }

    pub fn has_resource(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Look up a declared function spec by resource id.
    pub fn function(&self, id: &str) -> Option<&UnitSpec> {
        self.resources.iter().find_map(|r| match r {
            ResourceDecl::Function { id: rid, spec } if rid == id => Some(spec),
            _ => None,
        })
    }

    /// Register a route. Collisions are rejected, never merged.
    pub fn register_route(&mut self, route: Route) -> ComposeResult<()> {
        self.routes.register(route)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Record an additive permission grant.
    pub fn grant(&mut self, grant: Grant) {
        debug!(principal = %grant.principal, actions = grant.actions.len(), "granted");
        self.grants.push(grant);
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn add_event_rule(&mut self, rule: EventRule) {
        debug!(rule = %rule.id, target = %rule.target, "event rule added");
        self.event_rules.push(rule);
    }

    pub fn add_schedule_rule(&mut self, rule: ScheduleRule) {
        debug!(rule = %rule.id, enabled = rule.enabled, "schedule rule added");
        self.schedule_rules.push(rule);
    }

    /// Conditionally attach something to a target. `Guard::Absent`
    /// produces no association and is not an error.
    pub fn associate(
        &mut self,
        guard: Guard,
        id: &str,
        target: &str,
        attachment: &str,
    ) -> Option<&Association> {
        if !guard.is_present() {
            debug!(association = id, "guard absent, skipping association");
            return None;
        }
        self.associations.push(Association {
            id: id.to_string(),
            target: target.to_string(),
            attachment: attachment.to_string(),
            enabled: guard.is_enabled(),
        });
        self.associations.last()
    }

    /// Conditionally attach based on an optional enabling input. The
    /// guard is evaluated here, once: a missing or empty input means
    /// absent, anything else attaches enabled.
    pub fn associate_flag(
        &mut self,
        id: &str,
        target: &str,
        value: Option<&str>,
    ) -> Option<&Association> {
        let guard = Guard::from_flag(value);
        self.associate(guard, id, target, value.unwrap_or_default())
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Record a named deployment output. Names must be unique.
    pub fn set_output(&mut self, name: &str, value: &str) -> ComposeResult<()> {
        if self.outputs.contains_key(name) {
            return Err(ComposeError::DuplicateOutput(name.to_string()));
        }
        self.outputs.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn outputs(&self) -> &BTreeMap<String, String> {
        &self.outputs
    }

    pub fn event_rules(&self) -> &[EventRule] {
        &self.event_rules
    }

    pub fn schedule_rules(&self) -> &[ScheduleRule] {
        &self.schedule_rules
    }

    /// Freeze the graph into a manifest.
    pub fn synth(self) -> Manifest {
        debug!(
            deployment = %self.deployment,
            resources = self.resources.len(),
            routes = self.routes.len(),
            grants = self.grants.len(),
            "synthesizing manifest"
        );
        Manifest {
            deployment: self.deployment,
            resources: self.resources,
            routes: self.routes.into_routes(),
            grants: self.grants,
            event_rules: self.event_rules,
            schedule_rules: self.schedule_rules,
            associations: self.associations,
            outputs: self.outputs,
        }
    }
}
