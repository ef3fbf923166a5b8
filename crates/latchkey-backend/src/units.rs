//! Compute-unit declaration helpers.
//!
//! Every backend unit goes through [`declare_unit`]: resolve the pinned
//! bundle from config, build the spec with its environment mapping, and
//! declare the function resource. The returned [`UnitHandle`] carries
//! the accessors downstream wiring needs (name, log group, role, ARN).

use latchkey_compose::{Ref, ResourceDecl, Scope};
use latchkey_core::{DeployConfig, Grant, Runtime, UnitSpec};
use tracing::debug;

use crate::error::{BackendError, BackendResult};

/// Table read/write verbs granted to every unit, exactly once each.
pub const TABLE_RW_ACTIONS: &[&str] = &[
    "dynamodb:GetItem",
    "dynamodb:Query",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
];

/// Handle to one declared compute unit.
#[derive(Debug, Clone)]
pub struct UnitHandle {
    /// Short unit key, matching its `[bundles.<key>]` entry.
    pub key: String,
    /// Function resource id in the scope.
    pub id: String,
    /// Concrete function name.
    pub name: String,
}

impl UnitHandle {
    /// Execution identity the unit's grants are bound to.
    pub fn role(&self) -> String {
        format!("{}-role", self.name)
    }

    pub fn role_arn(&self) -> Ref {
        Ref::new(&self.id, "role_arn")
    }

    pub fn arn(&self) -> Ref {
        Ref::new(&self.id, "arn")
    }

    /// Log location for downstream observability wiring.
    pub fn log_group(&self) -> String {
        format!("/aws/lambda/{}", self.name)
    }
}

/// Declare one unit from its pinned bundle and environment mapping.
pub(crate) fn declare_unit(
    scope: &mut Scope,
    config: &DeployConfig,
    key: &str,
    handler: &str,
    runtime: Runtime,
    memory_mb: u32,
    timeout_secs: u32,
    env: &[(String, String)],
) -> BackendResult<UnitHandle> {
    let bundle = config
        .bundle(key)
        .ok_or_else(|| BackendError::MissingBundle(key.to_string()))?
        .to_bundle_ref()?;

    let name = format!("{}-{key}", config.deployment.name);
    let mut spec = UnitSpec::new(&name, handler, runtime, bundle)?
        .with_memory(memory_mb)
        .with_timeout(timeout_secs);
    for (k, v) in env {
        spec = spec.with_env(k, v);
    }

    let id = format!("{key}-fn");
    debug!(unit = %name, handler, "declaring unit");
    scope.declare(ResourceDecl::Function {
        id: id.clone(),
        spec,
    })?;

    Ok(UnitHandle {
        key: key.to_string(),
        id,
        name,
    })
}

/// Record one allow grant for a unit's execution identity.
pub(crate) fn grant_unit(
    scope: &mut Scope,
    unit: &UnitHandle,
    actions: &[&str],
    resources: &[String],
) {
    scope.grant(Grant::allow(&unit.role(), actions, resources));
}
