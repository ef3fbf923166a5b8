//! Leaf resources — the globally shared handles.
//!
//! The shared table, identity pool, event channel, and key are created
//! first and passed explicitly to every consuming construct. Nothing
//! reaches them through ambient lookup; holding a handle is the only way
//! in, which keeps the constructs substitutable under test.

use latchkey_compose::{ComposeResult, Ref, ResourceDecl, Scope};
use latchkey_core::DeployConfig;

pub const TABLE_ID: &str = "shared-table";
pub const IDENTITY_POOL_ID: &str = "identity-pool";
pub const EVENT_CHANNEL_ID: &str = "event-channel";
pub const KEY_ID: &str = "key";

/// Handle to the single multi-tenant table.
#[derive(Debug, Clone)]
pub struct TableHandle {
    pub name: String,
}

impl TableHandle {
    pub fn arn(&self) -> Ref {
        Ref::new(TABLE_ID, "arn")
    }
}

/// Handle to the identity pool (user directory + token issuer).
#[derive(Debug, Clone)]
pub struct IdentityPoolHandle;

impl IdentityPoolHandle {
    pub fn user_pool_id(&self) -> Ref {
        Ref::new(IDENTITY_POOL_ID, "user_pool_id")
    }

    pub fn client_id(&self) -> Ref {
        Ref::new(IDENTITY_POOL_ID, "client_id")
    }

    pub fn arn(&self) -> Ref {
        Ref::new(IDENTITY_POOL_ID, "arn")
    }
}

/// Handle to the single shared publish/subscribe channel.
#[derive(Debug, Clone)]
pub struct EventChannelHandle {
    /// Source tag every publisher stamps on its events. Subscribers
    /// filter on this exact value.
    pub source_tag: String,
}

impl EventChannelHandle {
    pub fn arn(&self) -> Ref {
        Ref::new(EVENT_CHANNEL_ID, "arn")
    }
}

/// Handle to the encryption key.
#[derive(Debug, Clone)]
pub struct KeyHandle;

impl KeyHandle {
    pub fn arn(&self) -> Ref {
        Ref::new(KEY_ID, "arn")
    }
}

/// The four leaf resources, provisioned before anything that uses them.
#[derive(Debug, Clone)]
pub struct LeafResources {
    pub table: TableHandle,
    pub identity_pool: IdentityPoolHandle,
    pub channel: EventChannelHandle,
    pub key: KeyHandle,
}

impl LeafResources {
    pub fn provision(scope: &mut Scope, config: &DeployConfig) -> ComposeResult<Self> {
        let deployment = config.deployment.name.clone();

        let table_name = format!("{deployment}-shared");
        scope.declare(ResourceDecl::Table {
            id: TABLE_ID.to_string(),
            name: table_name.clone(),
            partition_key: "id".to_string(),
            sort_key: "sk".to_string(),
        })?;

        scope.declare(ResourceDecl::IdentityPool {
            id: IDENTITY_POOL_ID.to_string(),
            name: format!("{deployment}-users"),
        })?;

        let source_tag = format!("{deployment}.backend");
        scope.declare(ResourceDecl::EventChannel {
            id: EVENT_CHANNEL_ID.to_string(),
            name: format!("{deployment}-bus"),
            source_tag: source_tag.clone(),
        })?;

        scope.declare(ResourceDecl::Key {
            id: KEY_ID.to_string(),
            alias: format!("alias/{deployment}"),
        })?;

        Ok(LeafResources {
            table: TableHandle { name: table_name },
            identity_pool: IdentityPoolHandle,
            channel: EventChannelHandle { source_tag },
            key: KeyHandle,
        })
    }
}
