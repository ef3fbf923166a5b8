//! Latchkey core model.
//!
//! Shared vocabulary for the composition layer: resource names (ARNs),
//! prebuilt function bundles, deployable unit specs, additive permission
//! grants, conditional-creation guards, recurrence schedules, and the
//! deploy configuration file (`latchkey.toml`).
//!
//! Nothing in this crate talks to a cloud provider. Every type here is a
//! deployment-time declaration that the composition engine
//! (`latchkey-compose`) assembles into a manifest.

pub mod arn;
pub mod bundle;
pub mod config;
pub mod error;
pub mod grant;
pub mod guard;
pub mod schedule;
pub mod unit;

pub use arn::Arn;
pub use bundle::{BundleRef, BundleSource};
pub use config::DeployConfig;
pub use error::{CoreError, CoreResult};
pub use grant::{Effect, Grant};
pub use guard::Guard;
pub use schedule::Schedule;
pub use unit::{Runtime, UnitSpec};
