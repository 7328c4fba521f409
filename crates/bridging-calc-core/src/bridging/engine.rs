use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bridging::basic::{derive_basic, BasicCalculations};
use crate::bridging::inputs::BridgingInputs;
use crate::bridging::solver::{solve, IterativeCalculations};
use crate::config::CalculationConfig;
use crate::trace::{Trace, TraceStage, TraceStep};
use crate::types::{with_metadata, ComputationOutput, Money, Ratio};
use crate::BridgingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Complete result of one bridging calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgingResults {
    /// Stage A: values derived straight from the inputs
    pub basic: BasicCalculations,
    /// Stage B: the converged (or last-attempted) fixed point
    pub solver: IterativeCalculations,
    /// Peak funding the caps refuse to cover; > 0 is a genuine gap
    pub shortfall: Money,
    /// Cash the borrower must bring for fees and costs not capitalised
    pub additional_cash_required: Money,
    /// (bridge debt + end debt) / peak shaded valuation
    pub peak_debt_lvr_excl_icap: Ratio,
    /// peak debt including ICAP / peak shaded valuation
    pub peak_debt_lvr_incl_icap: Ratio,
    /// end debt / new property value
    pub end_debt_lvr: Ratio,
    /// Residual of the balance identity; a converged result keeps this ≈ 0
    pub check_value: Money,
    /// Ordered calculation steps, empty when recording is switched off
    pub trace: Vec<TraceStep>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a full bridging assessment.
///
/// Deterministic: identical inputs and configuration give identical values
/// and iteration count (the solver is seeded from a fixed starting point
/// and uses no randomness). All state is per-call, so concurrent callers
/// can share the inputs and configuration freely.
///
/// The engine performs no range validation; out-of-range inputs produce
/// arithmetically consistent but possibly meaningless results. Failing to
/// converge is reported through `solver.converged` and a warning, never an
/// error.
pub fn calculate_bridging(
    input: &BridgingInputs,
    config: &CalculationConfig,
) -> BridgingResult<ComputationOutput<BridgingResults>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut trace = Trace::new(config.record_trace);

    // --- Stage A: basic values ---
    let basic = derive_basic(input, &mut trace);

    // --- Stage B: fixed point ---
    let solver = solve(input, &basic, config, &mut trace);

    if !solver.converged {
        warnings.push(format!(
            "Solver did not converge within {} passes; values are best-effort",
            solver.iterations
        ));
    }

    // --- Stage C: final metrics ---
    let shortfall = basic.peak_debt_before_cap + solver.fcap + solver.assessed_icap
        - solver.peak_debt_including_icap;
    let additional_cash_required = additional_cash(input, &basic, &solver);

    let (peak_debt_lvr_excl_icap, peak_debt_lvr_incl_icap) = if basic.peak_shaded_valuation.is_zero()
    {
        warnings.push("Peak shaded valuation is zero; peak debt LVRs reported as 0".into());
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            (solver.bridge_debt + solver.end_debt) / basic.peak_shaded_valuation,
            solver.peak_debt_including_icap / basic.peak_shaded_valuation,
        )
    };

    // Decimal carries no NaN, so the known degenerate case of a zero new
    // property value reports a zero ratio and a warning instead.
    let end_debt_lvr = if input.new_property_value.is_zero() {
        warnings.push("New property value is zero; end debt LVR reported as 0".into());
        Decimal::ZERO
    } else {
        solver.end_debt / input.new_property_value
    };

    let check_value = solver.end_debt + solver.bridge_debt_excluding_fcap
        - basic.peak_debt_before_cap
        + shortfall;

    trace.record(TraceStage::Metrics, "shortfall", shortfall);
    trace.record(
        TraceStage::Metrics,
        "additional cash required",
        additional_cash_required,
    );
    trace.record(
        TraceStage::Metrics,
        "peak debt lvr excl icap",
        peak_debt_lvr_excl_icap,
    );
    trace.record(
        TraceStage::Metrics,
        "peak debt lvr incl icap",
        peak_debt_lvr_incl_icap,
    );
    trace.record(TraceStage::Metrics, "end debt lvr", end_debt_lvr);
    trace.record(TraceStage::Metrics, "check value", check_value);

    let output = BridgingResults {
        basic,
        solver,
        shortfall,
        additional_cash_required,
        peak_debt_lvr_excl_icap,
        peak_debt_lvr_incl_icap,
        end_debt_lvr,
        check_value,
        trace: trace.into_steps(),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Bridging Debt Fixed-Point Assessment",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Up-front cash for everything that does not capitalise. The two
/// establishment fees are mutually exclusive by end debt sign.
fn additional_cash(
    input: &BridgingInputs,
    basic: &BasicCalculations,
    solver: &IterativeCalculations,
) -> Money {
    let mut required = Decimal::ZERO;

    if input.pg_included && !input.pg_fee_capitalised {
        required += input.pg_fee_amount;
    }
    if !input.purchase_costs_capitalised {
        required += basic.purchase_costs_amount;
    }
    if !input.bridging_fees_capitalised {
        if solver.end_debt > Decimal::ZERO {
            required += input.bridging_fees_end_debt_amount;
        } else {
            required += solver.bridge_debt * input.bridging_fees_no_end_debt_percent / dec!(100);
        }
    }

    required
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridging::inputs::RepaymentType;

    fn sample_inputs() -> BridgingInputs {
        BridgingInputs {
            existing_property_value: dec!(1000000),
            existing_debt: dec!(400000),
            new_property_value: dec!(800000),
            additional_borrowings: dec!(50000),
            savings: dec!(300000),
            bridging_term_months: 12,
            bridging_repayment_type: RepaymentType::Icap,
            bridging_interest_rate: dec!(7),
            ..BridgingInputs::default()
        }
    }

    #[test]
    fn test_methodology_and_metadata() {
        let result = calculate_bridging(&sample_inputs(), &CalculationConfig::default()).unwrap();
        assert_eq!(result.methodology, "Bridging Debt Fixed-Point Assessment");
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_additional_cash_uncapitalised_fee_on_no_end_debt() {
        let result = calculate_bridging(&sample_inputs(), &CalculationConfig::default()).unwrap();
        let out = &result.result;

        // 950,000 * 0.75%
        assert_eq!(out.additional_cash_required, dec!(7125));
        assert_eq!(out.check_value, dec!(0));
    }

    #[test]
    fn test_additional_cash_collects_every_uncapitalised_item() {
        let mut inputs = sample_inputs();
        inputs.bridging_fees_capitalised = true; // settles with end debt
        inputs.purchase_costs_percent = dec!(5);
        inputs.purchase_costs_capitalised = false;
        inputs.pg_included = true;
        inputs.pg_fee_capitalised = false;

        let result = calculate_bridging(&inputs, &CalculationConfig::default()).unwrap();
        let out = &result.result;

        assert!(out.solver.end_debt > Decimal::ZERO);
        // PG fee + purchase costs; the fixed end debt fee capitalised
        assert_eq!(out.additional_cash_required, dec!(7500) + dec!(40000));
    }

    #[test]
    fn test_fixed_end_debt_fee_paid_in_cash() {
        let mut inputs = sample_inputs();
        // Leave fees uncapitalised but force an end debt with a bigger gap
        inputs.savings = dec!(0);
        let result = calculate_bridging(&inputs, &CalculationConfig::default()).unwrap();
        let out = &result.result;

        assert!(out.solver.end_debt > Decimal::ZERO);
        assert_eq!(out.additional_cash_required, dec!(1500));
    }

    #[test]
    fn test_lvr_metrics() {
        let result = calculate_bridging(&sample_inputs(), &CalculationConfig::default()).unwrap();
        let out = &result.result;

        // 950,000 / 1,750,000
        assert_eq!(out.peak_debt_lvr_excl_icap, dec!(950000) / dec!(1750000));
        assert_eq!(
            out.peak_debt_lvr_incl_icap,
            out.solver.peak_debt_including_icap / dec!(1750000)
        );
        assert_eq!(out.end_debt_lvr, dec!(0));
    }

    #[test]
    fn test_zero_new_property_value_is_degenerate_but_permitted() {
        let mut inputs = sample_inputs();
        inputs.new_property_value = dec!(0);

        let result = calculate_bridging(&inputs, &CalculationConfig::default()).unwrap();
        assert_eq!(result.result.end_debt_lvr, dec!(0));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("New property value is zero")));
    }

    #[test]
    fn test_non_convergence_warns_and_returns_values() {
        let mut inputs = sample_inputs();
        inputs.bridging_fees_capitalised = true;
        let config = CalculationConfig {
            max_iterations: 1,
            ..CalculationConfig::default()
        };

        let result = calculate_bridging(&inputs, &config).unwrap();
        assert!(!result.result.solver.converged);
        assert!(result.warnings.iter().any(|w| w.contains("did not converge")));
        // Best-effort values are still populated
        assert!(result.result.solver.bridge_debt > Decimal::ZERO);
    }

    #[test]
    fn test_trace_recording_and_suppression() {
        let inputs = sample_inputs();

        let recorded = calculate_bridging(&inputs, &CalculationConfig::default()).unwrap();
        assert!(!recorded.result.trace.is_empty());
        assert!(recorded
            .result
            .trace
            .iter()
            .any(|s| s.stage == TraceStage::Solver && s.iteration == Some(1)));

        let silent_config = CalculationConfig {
            record_trace: false,
            ..CalculationConfig::default()
        };
        let silent = calculate_bridging(&inputs, &silent_config).unwrap();
        assert!(silent.result.trace.is_empty());
        // Numeric results are unaffected by trace suppression
        assert_eq!(
            silent.result.solver.bridge_debt,
            recorded.result.solver.bridge_debt
        );
        assert_eq!(silent.result.check_value, recorded.result.check_value);
    }

    #[test]
    fn test_determinism() {
        let inputs = sample_inputs();
        let config = CalculationConfig::default();

        let a = calculate_bridging(&inputs, &config).unwrap();
        let b = calculate_bridging(&inputs, &config).unwrap();

        assert_eq!(a.result.solver.bridge_debt, b.result.solver.bridge_debt);
        assert_eq!(a.result.solver.end_debt, b.result.solver.end_debt);
        assert_eq!(a.result.solver.iterations, b.result.solver.iterations);
        assert_eq!(a.result.check_value, b.result.check_value);
    }
}
