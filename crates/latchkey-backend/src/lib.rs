//! Latchkey backend constructs.
//!
//! Assembles the access-management backend out of composition primitives:
//! leaf resources first (shared table, identity pool, event channel,
//! key), then the sibling subsystems the backend consumes by reference
//! (access handler, target granter, governance), then the composite
//! backend itself — one routing facade plus the seven compute units and
//! their grants — and finally the aggregated deployment outputs.
//!
//! Entry point: [`stack::synthesize`].

pub mod backend;
pub mod error;
pub mod facade;
pub mod leaf;
pub mod siblings;
pub mod stack;
pub mod units;

pub use backend::CompositeBackend;
pub use error::{BackendError, BackendResult};
pub use facade::RoutingFacade;
pub use leaf::LeafResources;
pub use siblings::Siblings;
pub use units::UnitHandle;
