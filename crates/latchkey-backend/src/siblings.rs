//! Sibling subsystems consumed by reference.
//!
//! The access handler (request/approval workflows), target granter, and
//! governance subsystems are built before the composite backend and are
//! opaque from this layer's point of view: each is declared as a single
//! subsystem resource whose interface is a handful of symbolic refs
//! (facade URL, invoke ARN, state-machine ARNs). Their internals are out
//! of scope here.

use latchkey_compose::{ComposeResult, Ref, ResourceDecl, Scope};

pub const ACCESS_HANDLER_ID: &str = "access-handler";
pub const GRANTER_ID: &str = "granter";
pub const GOVERNANCE_ID: &str = "governance";

/// The sibling subsystem running the request/approval workflows.
#[derive(Debug, Clone)]
pub struct AccessHandlerHandle;

impl AccessHandlerHandle {
    /// Public URL of the access handler's own routing facade.
    pub fn api_url(&self) -> Ref {
        Ref::new(ACCESS_HANDLER_ID, "api_url")
    }

    /// Invoke target for facade-level calls from other units.
    pub fn invoke_arn(&self) -> Ref {
        Ref::new(ACCESS_HANDLER_ID, "invoke_arn")
    }

    pub fn request_machine_arn(&self) -> Ref {
        Ref::new(ACCESS_HANDLER_ID, "request_machine_arn")
    }

    pub fn approval_machine_arn(&self) -> Ref {
        Ref::new(ACCESS_HANDLER_ID, "approval_machine_arn")
    }
}

/// The subsystem that grants/revokes access on target accounts.
#[derive(Debug, Clone)]
pub struct TargetGranterHandle;

impl TargetGranterHandle {
    pub fn grant_machine_arn(&self) -> Ref {
        Ref::new(GRANTER_ID, "grant_machine_arn")
    }

    pub fn revoke_machine_arn(&self) -> Ref {
        Ref::new(GRANTER_ID, "revoke_machine_arn")
    }
}

/// Governance/audit subsystem. Only its log location is surfaced.
#[derive(Debug, Clone)]
pub struct GovernanceHandle;

impl GovernanceHandle {
    pub fn audit_log_group(&self) -> Ref {
        Ref::new(GOVERNANCE_ID, "audit_log_group")
    }
}

/// All sibling handles, provisioned after the leaves and before the
/// composite backend.
#[derive(Debug, Clone)]
pub struct Siblings {
    pub access_handler: AccessHandlerHandle,
    pub granter: TargetGranterHandle,
    pub governance: GovernanceHandle,
}

impl Siblings {
    pub fn provision(scope: &mut Scope) -> ComposeResult<Self> {
        let deployment = scope.deployment().to_string();
        for (id, suffix) in [
            (ACCESS_HANDLER_ID, "access-handler"),
            (GRANTER_ID, "granter"),
            (GOVERNANCE_ID, "governance"),
        ] {
            scope.declare(ResourceDecl::Subsystem {
                id: id.to_string(),
                name: format!("{deployment}-{suffix}"),
            })?;
        }
        Ok(Siblings {
            access_handler: AccessHandlerHandle,
            granter: TargetGranterHandle,
            governance: GovernanceHandle,
        })
    }

    /// Exact state-machine ARNs controllable by the API unit. Grants are
    /// scoped to these, never to a wildcard.
    pub fn state_machine_arns(&self) -> Vec<String> {
        vec![
            self.access_handler.request_machine_arn().render(),
            self.access_handler.approval_machine_arn().render(),
            self.granter.grant_machine_arn().render(),
            self.granter.revoke_machine_arn().render(),
        ]
    }
}
