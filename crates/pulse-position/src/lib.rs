//! Position lifecycle management.
//!
//! Turns an actionable entry signal into a risk-managed position with
//! stop placement, an irreversible breakeven lock, and profit-tiered
//! trailing stops that only ever tighten.
//!
//! # Key components
//!
//! - [`Position`]: the position entity and its status state machine
//! - [`LifecycleEngine`]: owns positions and the account balance;
//!   open / update / close / partial close as atomic transitions
//! - [`CostModel`]: execution-cost collaborator contract
//! - [`PositionEvent`]: snapshots emitted to orchestration collaborators

pub mod account;
pub mod config;
pub mod costs;
pub mod engine;
pub mod error;
pub mod events;
pub mod position;

pub use account::Account;
pub use config::LifecycleConfig;
pub use costs::{CostModel, PercentFeeModel, TradeCosts, VolatilityBucket};
pub use engine::{LifecycleEngine, OpenRequest};
pub use error::{LifecycleError, LifecycleResult};
pub use events::PositionEvent;
pub use position::{
    ClosedDetails, CostBreakdown, ExitReason, Position, PositionStatus,
};
