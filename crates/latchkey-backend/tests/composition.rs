//! End-to-end composition tests.
//!
//! Exercises the full stack assembly against the contracts the wiring
//! layer promises: conditional grants and associations degrade to
//! absent, every unit gets exactly one shared-table grant, route trees
//! never merge, and the cron flag flips rule state without removing the
//! rule.

use latchkey_backend::stack::synthesize;
use latchkey_backend::{CompositeBackend, LeafResources, Siblings};
use latchkey_compose::{AuthMode, ComposeError, Manifest, ResourceDecl, Route, Scope};
use latchkey_core::DeployConfig;

const AUTO_APPROVAL: &str = "arn:aws:lambda:us-east-1:111122223333:function:auto-approve";
const FIREWALL: &str = "arn:aws:wafv2:us-east-1:111122223333:global/webacl/main/abc123";

fn test_config() -> DeployConfig {
    DeployConfig::scaffold("latchkey", "us-east-1", "111122223333")
}

fn config_with_features(f: impl FnOnce(&mut latchkey_core::config::FeaturesConfig)) -> DeployConfig {
    let mut config = test_config();
    let mut features = latchkey_core::config::FeaturesConfig::default();
    f(&mut features);
    config.features = Some(features);
    config
}

fn invoke_grants_on(manifest: &Manifest, resource: &str) -> usize {
    manifest
        .grants
        .iter()
        .filter(|g| g.covers_action("lambda:InvokeFunction") && g.targets(resource))
        .count()
}

#[test]
fn empty_auto_approval_produces_no_invoke_grant() {
    let config = config_with_features(|f| f.auto_approval_arn = Some(String::new()));
    let manifest = synthesize(&config).unwrap();
    assert_eq!(invoke_grants_on(&manifest, AUTO_APPROVAL), 0);

    // The env channel stays clean too.
    let api = manifest
        .resources
        .iter()
        .find_map(|r| match r {
            ResourceDecl::Function { id, spec } if id == "api-fn" => Some(spec),
            _ => None,
        })
        .unwrap();
    assert!(!api.env.contains_key("AUTO_APPROVAL_ARN"));
}

#[test]
fn configured_auto_approval_produces_exactly_one_invoke_grant() {
    let config = config_with_features(|f| f.auto_approval_arn = Some(AUTO_APPROVAL.to_string()));
    let manifest = synthesize(&config).unwrap();
    assert_eq!(invoke_grants_on(&manifest, AUTO_APPROVAL), 1);

    let grant = manifest
        .grants
        .iter()
        .find(|g| g.targets(AUTO_APPROVAL))
        .unwrap();
    assert_eq!(grant.principal, "latchkey-api-role");
}

#[test]
fn firewall_association_is_all_or_nothing() {
    let without = synthesize(&test_config()).unwrap();
    assert!(without.associations.is_empty());

    let config = config_with_features(|f| f.firewall_arn = Some(FIREWALL.to_string()));
    let with = synthesize(&config).unwrap();
    assert_eq!(with.associations.len(), 1);
    assert_eq!(with.associations[0].target, "backend-api/stages/prod");
    assert_eq!(with.associations[0].attachment, FIREWALL);
    assert!(with.associations[0].enabled);
}

#[test]
fn vpc_attachment_is_all_or_nothing() {
    let without = synthesize(&test_config()).unwrap();
    assert!(without.associations.is_empty());

    let empty = config_with_features(|f| f.vpc_endpoint = Some(String::new()));
    assert!(synthesize(&empty).unwrap().associations.is_empty());

    let config = config_with_features(|f| {
        f.vpc_endpoint = Some("https://vpce-0abc123.example.internal".to_string())
    });
    let with = synthesize(&config).unwrap();
    assert_eq!(with.associations.len(), 1);
    assert_eq!(with.associations[0].id, "cache-sync-vpc");
    assert_eq!(with.associations[0].target, "cache-sync-fn");
    assert!(with.associations[0].enabled);
}

#[test]
fn every_unit_has_exactly_one_table_grant() {
    let manifest = synthesize(&test_config()).unwrap();
    let function_ids = manifest.function_ids();
    assert_eq!(function_ids.len(), 8);

    for id in function_ids {
        let role = format!(
            "latchkey-{}-role",
            id.strip_suffix("-fn").unwrap_or(id)
        );
        let table_grants = manifest
            .grants_for(&role)
            .into_iter()
            .filter(|g| g.covers_action("dynamodb:PutItem"))
            .count();
        assert_eq!(table_grants, 1, "unit {id} table grants");
    }
}

#[test]
fn authenticated_tree_carries_the_authorizer() {
    let manifest = synthesize(&test_config()).unwrap();
    let api = manifest
        .routes
        .iter()
        .find(|r| r.path == "/api/v1/{proxy+}")
        .unwrap();
    assert_eq!(api.auth, AuthMode::IdentityPool);

    let webhook = manifest
        .routes
        .iter()
        .find(|r| r.path == "/webhook/v1/{proxy+}")
        .unwrap();
    assert_eq!(webhook.auth, AuthMode::None);
}

#[test]
fn cron_flag_disables_rule_without_removing_it() {
    let config = config_with_features(|f| f.run_as_cron = Some(false));
    let manifest = synthesize(&config).unwrap();

    let rule = manifest
        .schedule_rules
        .iter()
        .find(|r| r.id == "cache-sync-cron")
        .unwrap();
    assert!(!rule.enabled);

    // On-demand invocation still works: the target exists and the rule
    // keeps invoke rights for when it is re-enabled.
    assert!(manifest.function_ids().contains(&"cache-sync-fn"));
    assert_eq!(invoke_grants_on(&manifest, "${cache-sync-fn.arn}"), 1);
}

#[test]
fn notifier_rules_filter_exactly_and_retry_twice() {
    let manifest = synthesize(&test_config()).unwrap();
    let slack = manifest
        .event_rules
        .iter()
        .find(|r| r.id == "notifier-slack-rule")
        .unwrap();
    assert_eq!(slack.source_tag, "latchkey.backend");
    assert_eq!(slack.retry_attempts, 2);
    assert!(slack.matches_source("latchkey.backend"));
    assert!(!slack.matches_source("latchkey.frontend"));
}

#[test]
fn colliding_route_trees_abort_composition() {
    let config = test_config();
    let mut scope = Scope::new(&config.deployment.name);
    let leaf = LeafResources::provision(&mut scope, &config).unwrap();
    let siblings = Siblings::provision(&mut scope).unwrap();
    let backend = CompositeBackend::new(&mut scope, &config, &leaf, &siblings).unwrap();

    // A second component claiming the API tree must fail loudly.
    let err = scope
        .register_route(Route::proxy(
            "/api/v1",
            AuthMode::IdentityPool,
            "rogue-fn",
        ))
        .unwrap_err();
    assert!(matches!(err, ComposeError::RouteCollision { .. }));
    drop(backend);
}

#[test]
fn manifest_round_trips_through_json() {
    let manifest = synthesize(&test_config()).unwrap();
    let json = manifest.to_json_pretty().unwrap();
    let parsed: Manifest = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.outputs, manifest.outputs);
    assert_eq!(parsed.routes, manifest.routes);
    assert_eq!(parsed.grants.len(), manifest.grants.len());
}
