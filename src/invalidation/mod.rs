//! # Invalidation Engine
//!
//! - [`planner`]: request mode to ordered per-backend plan
//! - [`executor`]: bounded, isolated execution of a plan
//! - [`hard_reset`]: direct storage wipe beneath the backends
//! - [`coordinator`]: token-gated public facade
//! - [`bootstrap`]: coordinator assembly from configuration

pub mod bootstrap;
pub mod coordinator;
pub mod executor;
pub mod hard_reset;
pub mod planner;

pub use bootstrap::CoordinatorBootstrap;
pub use coordinator::{AuthorizedCoordinator, CacheCoordinator};
pub use executor::InvalidationExecutor;
pub use hard_reset::HardReset;
pub use planner::{plan, Operation, PlannedAction, PlannedOperation};
