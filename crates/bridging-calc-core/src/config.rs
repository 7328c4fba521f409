use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Stands in for an unbounded candidate in the bridge debt minimisation.
/// Large enough that no loan within policy bounds ever reaches it.
pub const SOLVER_INFINITY: Decimal = dec!(1000000000);

/// Process-wide solver settings. Constructed once, shared across calls;
/// every calculation carries its own per-call state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Absolute convergence tolerance, in currency units.
    pub tolerance: Decimal,
    /// Hard cap on solver passes. Each pass is O(1) arithmetic, so a run
    /// always terminates within this many steps.
    pub max_iterations: u32,
    /// Sentinel used where a candidate must not constrain the minimum.
    pub unbounded_candidate: Decimal,
    /// Inclusive bounds for the bridging term, in months. Enforced by
    /// `validate_bridging_inputs` on behalf of callers, not by the engine.
    pub min_term_months: u32,
    pub max_term_months: u32,
    /// When false, no trace steps are recorded; the numeric path is
    /// unchanged either way.
    pub record_trace: bool,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        CalculationConfig {
            tolerance: dec!(0.01),
            max_iterations: 100,
            unbounded_candidate: SOLVER_INFINITY,
            min_term_months: 1,
            max_term_months: 12,
            record_trace: true,
        }
    }
}
