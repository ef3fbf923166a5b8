//! The composite backend.
//!
//! Wires one routing facade and the seven compute units into a single
//! addressable deployment: environment mappings carry the shared-handle
//! values into each unit, grants give each unit exactly the access it
//! needs, event/schedule rules hook up the asynchronous units, and the
//! optional firewall/auto-approval inputs degrade to "absent" when not
//! configured.

use latchkey_compose::{AuthMode, EventRule, ScheduleRule, Scope};
use latchkey_core::{Arn, DeployConfig, Grant, Runtime};
use tracing::info;

use crate::error::BackendResult;
use crate::facade::RoutingFacade;
use crate::leaf::LeafResources;
use crate::siblings::Siblings;
use crate::units::{declare_unit, grant_unit, TABLE_RW_ACTIONS, UnitHandle};

const FACADE_ID: &str = "backend-api";

/// The assembled backend: facade, units, and their wiring.
pub struct CompositeBackend {
    facade: RoutingFacade,
    pub api: UnitHandle,
    pub webhook: UnitHandle,
    pub event_handler: UnitHandle,
    pub notifier_slack: Option<UnitHandle>,
    pub notifier_teams: Option<UnitHandle>,
    pub identity_sync: UnitHandle,
    pub cache_sync: UnitHandle,
    pub health_check: UnitHandle,
}

impl CompositeBackend {
    /// Assemble the backend from already-created collaborators. Every
    /// collaborator is passed explicitly; a missing bundle pin or an
    /// occupied route aborts composition.
    pub fn new(
        scope: &mut Scope,
        config: &DeployConfig,
        leaf: &LeafResources,
        siblings: &Siblings,
    ) -> BackendResult<Self> {
        let facade = RoutingFacade::new(scope, FACADE_ID, config.stage())?;

        // Optional inputs, resolved once. Empty and missing are the same.
        let auto_approval = Arn::from_optional(config.auto_approval_arn())?;
        let firewall = Arn::from_optional(config.firewall_arn())?;

        // Access-handler calls go over the private endpoint when network
        // isolation is configured, otherwise over the public facade URL.
        let vpc_endpoint = config
            .vpc_endpoint()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let access_handler_url = match vpc_endpoint {
            Some(url) => url.to_string(),
            None => siblings.access_handler.api_url().render(),
        };

        // Environment shared by every unit: the sole runtime
        // configuration channel into the bundles.
        let base_env: Vec<(String, String)> = vec![
            ("TABLE_NAME".into(), leaf.table.name.clone()),
            ("FRONTEND_URL".into(), config.frontend.url.clone()),
            (
                "USER_POOL_ID".into(),
                leaf.identity_pool.user_pool_id().render(),
            ),
            ("CLIENT_ID".into(), leaf.identity_pool.client_id().render()),
            ("EVENT_BUS_ARN".into(), leaf.channel.arn().render()),
            ("EVENT_SOURCE".into(), leaf.channel.source_tag.clone()),
            ("KEY_ARN".into(), leaf.key.arn().render()),
            ("ACCESS_HANDLER_URL".into(), access_handler_url),
        ];
        let with_base = |extra: &[(&str, String)]| -> Vec<(String, String)> {
            let mut env = base_env.clone();
            env.extend(extra.iter().map(|(k, v)| (k.to_string(), v.clone())));
            env
        };

        let mut api_env = base_env.clone();
        if let Some(arn) = &auto_approval {
            api_env.push(("AUTO_APPROVAL_ARN".into(), arn.to_string()));
        }
        let api = declare_unit(
            scope,
            config,
            "api",
            "index.handler",
            Runtime::Node20,
            config.api_memory_mb(),
            config.api_timeout_secs(),
            &api_env,
        )?;

        let webhook = declare_unit(
            scope,
            config,
            "webhook",
            "webhook.handler",
            Runtime::Node20,
            config.memory_mb(),
            config.timeout_secs(),
            &base_env,
        )?;

        let event_handler = declare_unit(
            scope,
            config,
            "event-handler",
            "events.handler",
            Runtime::Node20,
            config.memory_mb(),
            config.timeout_secs(),
            &base_env,
        )?;

        let notifier_env = with_base(&[("SECRETS_PREFIX", config.secrets_prefix().to_string())]);
        let notifier_slack = if config.slack_enabled() {
            Some(declare_unit(
                scope,
                config,
                "notifier-slack",
                "slack.handler",
                Runtime::Node20,
                config.memory_mb(),
                config.timeout_secs(),
                &notifier_env,
            )?)
        } else {
            None
        };
        let notifier_teams = if config.teams_enabled() {
            Some(declare_unit(
                scope,
                config,
                "notifier-teams",
                "teams.handler",
                Runtime::Node20,
                config.memory_mb(),
                config.timeout_secs(),
                &notifier_env,
            )?)
        } else {
            None
        };

        let identity_sync = declare_unit(
            scope,
            config,
            "identity-sync",
            "sync.handler",
            Runtime::Python312,
            config.memory_mb(),
            config.timeout_secs(),
            &base_env,
        )?;

        let mut cache_sync_env = base_env.clone();
        cache_sync_env.push(("RUN_AS_CRON".into(), config.run_as_cron().to_string()));
        if let Some(filter) = config.identity_group_filter() {
            // Delivered verbatim; the unit interprets it.
            cache_sync_env.push(("IDENTITY_GROUP_FILTER".into(), filter.to_string()));
        }
        let cache_sync = declare_unit(
            scope,
            config,
            "cache-sync",
            "cache.handler",
            Runtime::Python312,
            config.memory_mb(),
            config.timeout_secs(),
            &cache_sync_env,
        )?;

        let health_check = declare_unit(
            scope,
            config,
            "health-check",
            "health.handler",
            Runtime::Node20,
            config.memory_mb(),
            config.timeout_secs(),
            &base_env,
        )?;

        let backend = CompositeBackend {
            facade,
            api,
            webhook,
            event_handler,
            notifier_slack,
            notifier_teams,
            identity_sync,
            cache_sync,
            health_check,
        };

        backend.wire_routes(scope)?;
        backend.facade.attach_firewall(scope, firewall.as_ref());
        // Network isolation: attach cache sync to the private endpoint.
        // No endpoint, no attachment.
        scope.associate_flag(
            &format!("{}-vpc", backend.cache_sync.key),
            &backend.cache_sync.id,
            vpc_endpoint,
        );
        backend.wire_grants(scope, config, leaf, siblings, auto_approval.as_ref());
        backend.wire_rules(scope, config, leaf)?;

        info!(
            deployment = scope.deployment(),
            units = backend.units().len(),
            "composite backend assembled"
        );
        Ok(backend)
    }

    /// Two independent trees: authenticated API and open webhook.
    fn wire_routes(&self, scope: &mut Scope) -> BackendResult<()> {
        self.facade
            .add_proxy_tree(scope, "/api/v1", AuthMode::IdentityPool, &self.api.id)?;
        self.facade
            .add_proxy_tree(scope, "/webhook/v1", AuthMode::None, &self.webhook.id)?;
        Ok(())
    }

    fn wire_grants(
        &self,
        scope: &mut Scope,
        config: &DeployConfig,
        leaf: &LeafResources,
        siblings: &Siblings,
        auto_approval: Option<&Arn>,
    ) {
        let table = vec![leaf.table.arn().render()];
        let channel = vec![leaf.channel.arn().render()];
        let pool = vec![leaf.identity_pool.arn().render()];
        let handler_facade = vec![siblings.access_handler.invoke_arn().render()];

        // Exactly one table read/write grant per unit.
        for unit in self.units() {
            grant_unit(scope, &unit, TABLE_RW_ACTIONS, &table);
        }

        // Publishers stamp the shared source tag; notifiers only consume.
        for publisher in [
            &self.api,
            &self.webhook,
            &self.event_handler,
            &self.identity_sync,
            &self.cache_sync,
            &self.health_check,
        ] {
            grant_unit(scope, publisher, &["events:PutEvents"], &channel);
        }

        // API handler: workflow control over the exact sibling state
        // machines, facade invoke, key decrypt.
        grant_unit(scope, &self.api, &["execute-api:Invoke"], &handler_facade);
        grant_unit(
            scope,
            &self.api,
            &[
                "states:StartExecution",
                "states:StopExecution",
                "states:DescribeExecution",
            ],
            &siblings.state_machine_arns(),
        );
        grant_unit(
            scope,
            &self.api,
            &["kms:Decrypt", "kms:GenerateDataKey"],
            &[leaf.key.arn().render()],
        );
        if let Some(arn) = auto_approval {
            grant_unit(
                scope,
                &self.api,
                &["lambda:InvokeFunction"],
                &[arn.to_string()],
            );
        }

        // Cache sync refreshes through the access handler's facade.
        grant_unit(
            scope,
            &self.cache_sync,
            &["execute-api:Invoke"],
            &handler_facade,
        );

        // Notifiers: path-prefixed secret namespace plus recipient lookup.
        let secret_ns = vec![format!(
            "arn:aws:secretsmanager:{}:{}:secret:{}/*",
            config.deployment.region,
            config.deployment.account,
            config.secrets_prefix().trim_start_matches('/'),
        )];
        for notifier in [&self.notifier_slack, &self.notifier_teams]
            .into_iter()
            .flatten()
        {
            grant_unit(
                scope,
                notifier,
                &["secretsmanager:GetSecretValue"],
                &secret_ns,
            );
            grant_unit(scope, notifier, &["cognito-idp:ListUsers"], &pool);
        }

        // Identity sync maintains the user directory.
        grant_unit(
            scope,
            &self.identity_sync,
            &[
                "cognito-idp:ListUsers",
                "cognito-idp:AdminCreateUser",
                "cognito-idp:AdminUpdateUserAttributes",
                "cognito-idp:AdminDisableUser",
            ],
            &pool,
        );
    }

    fn wire_rules(
        &self,
        scope: &mut Scope,
        config: &DeployConfig,
        leaf: &LeafResources,
    ) -> BackendResult<()> {
        let source_tag = &leaf.channel.source_tag;
        let retries = config.notify_retry_attempts();

        scope.add_event_rule(EventRule {
            id: "event-handler-rule".to_string(),
            source_tag: source_tag.clone(),
            target: self.event_handler.id.clone(),
            retry_attempts: 2,
        });
        for notifier in [&self.notifier_slack, &self.notifier_teams]
            .into_iter()
            .flatten()
        {
            scope.add_event_rule(EventRule {
                id: format!("{}-rule", notifier.key),
                source_tag: source_tag.clone(),
                target: notifier.id.clone(),
                retry_attempts: retries,
            });
        }

        // Recurrence rules exist regardless of the cron flag; the flag
        // only controls whether cache sync actually fires. On-demand
        // invocation is unaffected either way.
        for (rule_id, unit, schedule, enabled) in [
            (
                "cache-sync-cron",
                &self.cache_sync,
                config.cache_sync_schedule()?,
                config.run_as_cron(),
            ),
            (
                "health-check-cron",
                &self.health_check,
                config.health_check_schedule()?,
                true,
            ),
        ] {
            scope.add_schedule_rule(ScheduleRule {
                id: rule_id.to_string(),
                schedule,
                target: unit.id.clone(),
                enabled,
            });
            // The rule itself needs invoke rights on its target.
            scope.grant(Grant::allow(
                rule_id,
                &["lambda:InvokeFunction"],
                &[unit.arn().render()],
            ));
        }
        Ok(())
    }

    /// Base URL of the authenticated API tree.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.facade.url())
    }

    /// Base URL of the unauthenticated webhook tree.
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook/v1", self.facade.url())
    }

    pub fn facade(&self) -> &RoutingFacade {
        &self.facade
    }

    /// Every declared unit, in declaration order.
    pub fn units(&self) -> Vec<UnitHandle> {
        let mut units = vec![
            self.api.clone(),
            self.webhook.clone(),
            self.event_handler.clone(),
        ];
        units.extend(self.notifier_slack.clone());
        units.extend(self.notifier_teams.clone());
        units.push(self.identity_sync.clone());
        units.push(self.cache_sync.clone());
        units.push(self.health_check.clone());
        units
    }

    pub fn function_names(&self) -> Vec<String> {
        self.units().iter().map(|u| u.name.clone()).collect()
    }

    pub fn log_groups(&self) -> Vec<String> {
        self.units().iter().map(|u| u.log_group()).collect()
    }

    pub fn role_arns(&self) -> Vec<String> {
        self.units().iter().map(|u| u.role_arn().render()).collect()
    }
}
