//! The routing facade — one HTTP entry point per backend.
//!
//! Owns the facade resource and its stage, registers proxy route trees
//! against the shared collision-checked table, and carries the optional
//! firewall association. A facade never merges routes: a second
//! registration of an occupied path aborts composition.

use latchkey_compose::{AuthMode, ComposeResult, Ref, ResourceDecl, Route, Scope};
use latchkey_core::Arn;

/// One HTTP facade with a single deployed stage.
#[derive(Debug, Clone)]
pub struct RoutingFacade {
    id: String,
    stage: String,
}

impl RoutingFacade {
    pub fn new(scope: &mut Scope, id: &str, stage: &str) -> ComposeResult<Self> {
        let deployment = scope.deployment().to_string();
        scope.declare(ResourceDecl::HttpApi {
            id: id.to_string(),
            name: format!("{deployment}-{id}"),
            stage: stage.to_string(),
        })?;
        Ok(RoutingFacade {
            id: id.to_string(),
            stage: stage.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a `{proxy+}` tree forwarding every method and sub-path
    /// under `base` to one function.
    pub fn add_proxy_tree(
        &self,
        scope: &mut Scope,
        base: &str,
        auth: AuthMode,
        target: &str,
    ) -> ComposeResult<()> {
        scope.register_route(Route::proxy(base, auth, target))
    }

    /// Deployment-resolved base URL of the facade.
    pub fn url(&self) -> Ref {
        Ref::new(&self.id, "url")
    }

    /// Invoke identifier for `execute-api` grants against this facade.
    pub fn invoke_arn(&self) -> Ref {
        Ref::new(&self.id, "invoke_arn")
    }

    /// Association target for stage-level attachments.
    pub fn stage_target(&self) -> String {
        format!("{}/stages/{}", self.id, self.stage)
    }

    /// Attach a web ACL to the stage when a firewall is configured.
    /// `None` degrades to no association; it never fails composition.
    pub fn attach_firewall(&self, scope: &mut Scope, firewall: Option<&Arn>) {
        scope.associate_flag(
            &format!("{}-firewall", self.id),
            &self.stage_target(),
            firewall.map(Arn::as_str),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_compose::ComposeError;

    fn facade(scope: &mut Scope) -> RoutingFacade {
        RoutingFacade::new(scope, "backend-api", "prod").unwrap()
    }

    #[test]
    fn two_trees_on_one_facade() {
        let mut scope = Scope::new("latchkey");
        let f = facade(&mut scope);
        f.add_proxy_tree(&mut scope, "/api/v1", AuthMode::IdentityPool, "api-fn")
            .unwrap();
        f.add_proxy_tree(&mut scope, "/webhook/v1", AuthMode::None, "webhook-fn")
            .unwrap();
        assert_eq!(scope.routes().len(), 2);
    }

    #[test]
    fn occupied_tree_collides() {
        let mut scope = Scope::new("latchkey");
        let f = facade(&mut scope);
        f.add_proxy_tree(&mut scope, "/api/v1", AuthMode::IdentityPool, "api-fn")
            .unwrap();
        let err = f
            .add_proxy_tree(&mut scope, "/api/v1", AuthMode::IdentityPool, "other-fn")
            .unwrap_err();
        assert!(matches!(err, ComposeError::RouteCollision { .. }));
    }

    #[test]
    fn missing_firewall_means_no_association() {
        let mut scope = Scope::new("latchkey");
        let f = facade(&mut scope);
        f.attach_firewall(&mut scope, None);
        assert!(scope.associations().is_empty());
    }

    #[test]
    fn configured_firewall_attaches_to_stage() {
        let mut scope = Scope::new("latchkey");
        let f = facade(&mut scope);
        let acl = Arn::parse("arn:aws:wafv2:us-east-1:111122223333:global/webacl/main/abc")
            .unwrap();
        f.attach_firewall(&mut scope, Some(&acl));

        let assocs = scope.associations();
        assert_eq!(assocs.len(), 1);
        assert_eq!(assocs[0].target, "backend-api/stages/prod");
        assert!(assocs[0].enabled);
    }
}
