//! Deployable unit specs.
//!
//! A unit is one compute workload: an entry point into a prebuilt bundle,
//! a managed runtime, memory/timeout budgets, and a named environment
//! mapping. The environment mapping is the sole runtime configuration
//! channel into the unit; keys are unique by construction (`BTreeMap`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bundle::BundleRef;
use crate::error::{CoreError, CoreResult};

const DEFAULT_MEMORY_MB: u32 = 128;
const DEFAULT_TIMEOUT_SECS: u32 = 30;

/// Managed runtime a unit executes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Runtime {
    Node20,
    Python312,
}

impl Runtime {
    /// Stable identifier understood by the orchestration tool.
    pub fn identifier(&self) -> &'static str {
        match self {
            Runtime::Node20 => "nodejs20.x",
            Runtime::Python312 => "python3.12",
        }
    }
}

/// Specification for one deployable compute unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    /// Entry point in `file.symbol` form; must match the handler the
    /// bundle actually exports.
    pub handler: String,
    pub runtime: Runtime,
    pub memory_mb: u32,
    pub timeout_secs: u32,
    pub env: BTreeMap<String, String>,
    pub bundle: BundleRef,
}

impl UnitSpec {
    pub fn new(name: &str, handler: &str, runtime: Runtime, bundle: BundleRef) -> CoreResult<Self> {
        validate_handler(handler)?;
        Ok(UnitSpec {
            name: name.to_string(),
            handler: handler.to_string(),
            runtime,
            memory_mb: DEFAULT_MEMORY_MB,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            env: BTreeMap::new(),
            bundle,
        })
    }

    /// Set one environment variable. Later writes to the same key win.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_memory(mut self, memory_mb: u32) -> Self {
        self.memory_mb = memory_mb;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

fn validate_handler(handler: &str) -> CoreResult<()> {
    match handler.split_once('.') {
        Some((file, symbol)) if !file.is_empty() && !symbol.is_empty() => Ok(()),
        _ => Err(CoreError::InvalidHandler(handler.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleSource;

    fn test_bundle() -> BundleRef {
        BundleRef::new(
            BundleSource::parse("s3://artifacts/api.zip").unwrap(),
            "0".repeat(64).as_str(),
            "1.0.0",
        )
        .unwrap()
    }

    #[test]
    fn builds_spec_with_defaults() {
        let spec = UnitSpec::new("api", "index.handler", Runtime::Node20, test_bundle()).unwrap();
        assert_eq!(spec.memory_mb, 128);
        assert_eq!(spec.timeout_secs, 30);
        assert!(spec.env.is_empty());
    }

    #[test]
    fn env_keys_are_unique_last_write_wins() {
        let spec = UnitSpec::new("api", "index.handler", Runtime::Node20, test_bundle())
            .unwrap()
            .with_env("TABLE_NAME", "old")
            .with_env("TABLE_NAME", "new");
        assert_eq!(spec.env.get("TABLE_NAME").map(String::as_str), Some("new"));
        assert_eq!(spec.env.len(), 1);
    }

    #[test]
    fn rejects_malformed_handler() {
        assert!(UnitSpec::new("api", "no-dot", Runtime::Node20, test_bundle()).is_err());
        assert!(UnitSpec::new("api", ".handler", Runtime::Node20, test_bundle()).is_err());
        assert!(UnitSpec::new("api", "index.", Runtime::Node20, test_bundle()).is_err());
    }

    #[test]
    fn runtime_identifiers_are_stable() {
        assert_eq!(Runtime::Node20.identifier(), "nodejs20.x");
        assert_eq!(Runtime::Python312.identifier(), "python3.12");
    }
}
