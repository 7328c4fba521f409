//! Bridging loan assessment: what bridge the lender can write, which fees
//! and interest capitalise onto it, and what end debt remains once the
//! existing property settles.
//!
//! Three ordered stages: [`basic`] derives the non-iterative values,
//! [`solver`] finds the coupled bridge-debt/end-debt fixed point, and
//! [`engine`] derives the final metrics and assembles the output envelope.

pub mod basic;
pub mod engine;
pub mod inputs;
pub mod solver;

pub use basic::BasicCalculations;
pub use engine::{calculate_bridging, BridgingResults};
pub use inputs::{validate_bridging_inputs, BridgingInputs, RepaymentType};
pub use solver::{IterativeCalculations, SolverIteration};
