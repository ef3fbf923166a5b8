//! Latchkey composition engine.
//!
//! Builds the deployment declaration graph: resources are declared into a
//! [`Scope`] in dependency order, routes land in a collision-checked
//! route table, grants/rules/associations accumulate alongside, and
//! [`Scope::synth`] freezes everything into a serializable [`Manifest`]
//! for the external orchestration tool.
//!
//! Composition is single-pass and synchronous. Nothing here performs a
//! network call; failures are composition failures (duplicate id, route
//! collision, duplicate output) and abort the whole pass.

pub mod error;
pub mod manifest;
pub mod routes;
pub mod rules;
pub mod scope;

pub use error::{ComposeError, ComposeResult};
pub use manifest::Manifest;
pub use routes::{AuthMode, CorsPolicy, Route, RouteMethods, RouteTable};
pub use rules::{Association, EventRule, ScheduleRule};
pub use scope::{Ref, ResourceDecl, Scope};
