//! Domain types — candidates, constraints, snapshots, and the plan wire format.

pub mod candidate;
pub mod constraints;
pub mod plan;
pub mod snapshot;

pub use candidate::Candidate;
pub use constraints::{PortfolioConstraints, RiskProfile};
pub use plan::{
    Action, LadderStep, OrderPlan, OrderType, RecommendedAction, RiskControls, TimeInForce,
    TradePlan, UncertaintyBand,
};
pub use snapshot::{HeldPosition, SignalSnapshot};
