//! latchkey.toml deploy configuration parser.
//!
//! The deploy config is the flat option bag consumed by stack assembly:
//! URLs, feature flags, schedules, memory/timeout budgets, optional ARNs,
//! and the bundle pin table. Every option has one documented effect;
//! optional fields default through the accessor methods below, never
//! through hidden fallbacks elsewhere.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bundle::{BundleRef, BundleSource};
use crate::error::CoreResult;
use crate::schedule::Schedule;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    pub deployment: DeploymentConfig,
    pub frontend: FrontendConfig,
    pub features: Option<FeaturesConfig>,
    pub schedules: Option<SchedulesConfig>,
    pub limits: Option<LimitsConfig>,
    pub notifications: Option<NotificationsConfig>,
    pub sync: Option<SyncConfig>,
    /// Unit name → pinned bundle artifact.
    #[serde(default)]
    pub bundles: BTreeMap<String, BundleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub name: String,
    pub region: String,
    pub account: String,
    /// Facade stage name. Default: "prod".
    pub stage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Whether the cache-sync recurrence rule is active. The rule itself
    /// is always declared; false leaves it in place but disabled.
    pub run_as_cron: Option<bool>,
    /// Externally supplied auto-approval function. Empty or missing
    /// disables the conditional invoke grant.
    pub auto_approval_arn: Option<String>,
    /// Web ACL to associate with the facade stage. Empty or missing
    /// produces no association.
    pub firewall_arn: Option<String>,
    /// Private API endpoint for the access-handler path. Empty or
    /// missing means the public URL is used and no VPC attachment exists.
    pub vpc_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulesConfig {
    /// Cache-sync recurrence. Default: "rate(5 minutes)".
    pub cache_sync: Option<String>,
    /// Health-check recurrence. Default: "rate(5 minutes)".
    pub health_check: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Default memory budget for every unit. Default: 128.
    pub memory_mb: Option<u32>,
    /// Default timeout for every unit. Default: 30.
    pub timeout_secs: Option<u32>,
    /// API handler override; falls back to `memory_mb`.
    pub api_memory_mb: Option<u32>,
    /// API handler override; falls back to `timeout_secs`.
    pub api_timeout_secs: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Secret namespace prefix the notifiers may read under.
    /// Default: "/latchkey/notifications".
    pub secrets_prefix: Option<String>,
    /// Delivery retries on invocation failure. Default: 2.
    pub retry_attempts: Option<u32>,
    /// Chat notifier toggles. Default: both enabled.
    pub slack: Option<bool>,
    pub teams: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Optional directory group filter handed verbatim to the cache-sync
    /// unit's environment.
    pub identity_group_filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub source: String,
    pub sha256: String,
    pub version: String,
}

impl BundleConfig {
    pub fn to_bundle_ref(&self) -> CoreResult<BundleRef> {
        let source = BundleSource::parse(&self.source)?;
        BundleRef::new(source, &self.sha256, &self.version)
    }
}

impl DeployConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> CoreResult<Self> {
        let config: DeployConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn stage(&self) -> &str {
        self.deployment.stage.as_deref().unwrap_or("prod")
    }

    pub fn run_as_cron(&self) -> bool {
        self.features
            .as_ref()
            .and_then(|f| f.run_as_cron)
            .unwrap_or(true)
    }

    pub fn auto_approval_arn(&self) -> Option<&str> {
        self.features.as_ref()?.auto_approval_arn.as_deref()
    }

    pub fn firewall_arn(&self) -> Option<&str> {
        self.features.as_ref()?.firewall_arn.as_deref()
    }

    pub fn vpc_endpoint(&self) -> Option<&str> {
        self.features.as_ref()?.vpc_endpoint.as_deref()
    }

    pub fn cache_sync_schedule(&self) -> CoreResult<Schedule> {
        let expr = self
            .schedules
            .as_ref()
            .and_then(|s| s.cache_sync.as_deref())
            .unwrap_or("rate(5 minutes)");
        Schedule::parse(expr)
    }

    pub fn health_check_schedule(&self) -> CoreResult<Schedule> {
        let expr = self
            .schedules
            .as_ref()
            .and_then(|s| s.health_check.as_deref())
            .unwrap_or("rate(5 minutes)");
        Schedule::parse(expr)
    }

    pub fn memory_mb(&self) -> u32 {
        self.limits.as_ref().and_then(|l| l.memory_mb).unwrap_or(128)
    }

    pub fn timeout_secs(&self) -> u32 {
        self.limits
            .as_ref()
            .and_then(|l| l.timeout_secs)
            .unwrap_or(30)
    }

    pub fn api_memory_mb(&self) -> u32 {
        self.limits
            .as_ref()
            .and_then(|l| l.api_memory_mb)
            .unwrap_or_else(|| self.memory_mb())
    }

    pub fn api_timeout_secs(&self) -> u32 {
        self.limits
            .as_ref()
            .and_then(|l| l.api_timeout_secs)
            .unwrap_or_else(|| self.timeout_secs())
    }

    pub fn secrets_prefix(&self) -> &str {
        self.notifications
            .as_ref()
            .and_then(|n| n.secrets_prefix.as_deref())
            .unwrap_or("/latchkey/notifications")
    }

    pub fn notify_retry_attempts(&self) -> u32 {
        self.notifications
            .as_ref()
            .and_then(|n| n.retry_attempts)
            .unwrap_or(2)
    }

    pub fn slack_enabled(&self) -> bool {
        self.notifications.as_ref().and_then(|n| n.slack).unwrap_or(true)
    }

    pub fn teams_enabled(&self) -> bool {
        self.notifications.as_ref().and_then(|n| n.teams).unwrap_or(true)
    }

    pub fn identity_group_filter(&self) -> Option<&str> {
        self.sync.as_ref()?.identity_group_filter.as_deref()
    }

    pub fn bundle(&self, unit: &str) -> Option<&BundleConfig> {
        self.bundles.get(unit)
    }

    /// Scaffold a minimal latchkey.toml with every unit's bundle slot
    /// pointed at a local placeholder.
    pub fn scaffold(name: &str, region: &str, account: &str) -> Self {
        let units = [
            "api",
            "webhook",
            "event-handler",
            "notifier-slack",
            "notifier-teams",
            "identity-sync",
            "cache-sync",
            "health-check",
        ];
        let bundles = units
            .iter()
            .map(|unit| {
                (
                    unit.to_string(),
                    BundleConfig {
                        source: format!("file://./dist/{unit}.zip"),
                        sha256: "0".repeat(64),
                        version: "0.1.0".to_string(),
                    },
                )
            })
            .collect();
        DeployConfig {
            deployment: DeploymentConfig {
                name: name.to_string(),
                region: region.to_string(),
                account: account.to_string(),
                stage: None,
            },
            frontend: FrontendConfig {
                url: "https://portal.example.com".to_string(),
            },
            features: Some(FeaturesConfig::default()),
            schedules: None,
            limits: None,
            notifications: None,
            sync: None,
            bundles,
        }
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        // toml serialization of this shape cannot fail; map the error
        // through Io to keep the signature uniform.
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[deployment]
name = "latchkey"
region = "us-east-1"
account = "111122223333"

[frontend]
url = "https://portal.example.com"
"#;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = DeployConfig::from_str(MINIMAL).unwrap();
        assert_eq!(config.deployment.name, "latchkey");
        assert_eq!(config.stage(), "prod");
        assert!(config.run_as_cron());
        assert_eq!(config.notify_retry_attempts(), 2);
        assert_eq!(config.secrets_prefix(), "/latchkey/notifications");
        assert_eq!(
            config.cache_sync_schedule().unwrap(),
            Schedule::Rate { minutes: 5 }
        );
        assert!(config.auto_approval_arn().is_none());
        assert!(config.firewall_arn().is_none());
    }

    #[test]
    fn parses_feature_flags_and_limits() {
        let content = format!(
            "{MINIMAL}\n{}",
            r#"
[features]
run_as_cron = false
firewall_arn = "arn:aws:wafv2:us-east-1:111122223333:global/webacl/main/abc"

[limits]
memory_mb = 256
api_memory_mb = 512

[sync]
identity_group_filter = "engineering"
"#
        );
        let config = DeployConfig::from_str(&content).unwrap();
        assert!(!config.run_as_cron());
        assert_eq!(config.memory_mb(), 256);
        assert_eq!(config.api_memory_mb(), 512);
        assert_eq!(config.api_timeout_secs(), 30);
        assert_eq!(config.identity_group_filter(), Some("engineering"));
        assert!(config.firewall_arn().is_some());
    }

    #[test]
    fn scaffold_round_trips_through_toml() {
        let config = DeployConfig::scaffold("latchkey", "eu-west-1", "111122223333");
        let rendered = config.to_toml_string().unwrap();
        let parsed = DeployConfig::from_str(&rendered).unwrap();
        assert_eq!(parsed.deployment.region, "eu-west-1");
        assert_eq!(parsed.bundles.len(), 8);
        assert!(parsed.bundle("cache-sync").is_some());
    }

    #[test]
    fn bundle_config_builds_bundle_ref() {
        let bundle = BundleConfig {
            source: "s3://artifacts/api.zip".to_string(),
            sha256: "0".repeat(64),
            version: "1.2.0".to_string(),
        };
        let bundle_ref = bundle.to_bundle_ref().unwrap();
        assert_eq!(bundle_ref.source.scheme(), "s3");
    }
}
