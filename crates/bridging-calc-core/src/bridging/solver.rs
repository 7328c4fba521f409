use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bridging::basic::BasicCalculations;
use crate::bridging::inputs::{BridgingInputs, RepaymentType};
use crate::config::CalculationConfig;
use crate::trace::Trace;
use crate::types::Money;

/// State produced by one solver pass. Each pass is a pure function of the
/// incoming end debt estimate, so any pass can be reproduced in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverIteration {
    pub iteration: u32,
    pub end_debt_in: Money,
    pub bridge_debt: Money,
    pub bridge_debt_excluding_fcap: Money,
    pub fcap: Money,
    pub assessed_icap: Money,
    pub peak_debt_including_icap: Money,
    pub end_debt_out: Money,
    pub check_value: Money,
}

/// The fixed point found by the solver, or the last pass when the
/// iteration cap ran out first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterativeCalculations {
    pub bridge_debt: Money,
    pub bridge_debt_excluding_fcap: Money,
    /// Capitalised establishment fee
    pub fcap: Money,
    /// Capitalised interest assessed over the term
    pub assessed_icap: Money,
    pub peak_debt_including_icap: Money,
    pub end_debt: Money,
    pub iterations: u32,
    pub converged: bool,
}

/// Find an end debt that reproduces itself: the bridge debt depends on
/// whether any end debt remains (it changes which fee formula applies), and
/// the end debt depends on the bridge debt's fee and interest components.
/// Seeded at zero end debt; converged when the end debt estimate and the
/// balance check both settle inside the tolerance.
pub(crate) fn solve(
    input: &BridgingInputs,
    basic: &BasicCalculations,
    config: &CalculationConfig,
    trace: &mut Trace,
) -> IterativeCalculations {
    let mut state = run_pass(1, Decimal::ZERO, input, basic, config, trace);
    let mut converged = false;

    loop {
        if (state.end_debt_out - state.end_debt_in).abs() < config.tolerance
            && state.check_value.abs() < config.tolerance
        {
            converged = true;
            break;
        }
        if state.iteration >= config.max_iterations {
            break;
        }
        state = run_pass(
            state.iteration + 1,
            state.end_debt_out,
            input,
            basic,
            config,
            trace,
        );
    }

    IterativeCalculations {
        bridge_debt: state.bridge_debt,
        bridge_debt_excluding_fcap: state.bridge_debt_excluding_fcap,
        fcap: state.fcap,
        assessed_icap: state.assessed_icap,
        peak_debt_including_icap: state.peak_debt_including_icap,
        end_debt: state.end_debt_out,
        iterations: state.iteration,
        converged,
    }
}

fn run_pass(
    iteration: u32,
    end_debt: Money,
    input: &BridgingInputs,
    basic: &BasicCalculations,
    config: &CalculationConfig,
    trace: &mut Trace,
) -> SolverIteration {
    let bridge_debt = bridge_debt_for(end_debt, input, basic, config);
    let (bridge_debt_excluding_fcap, fcap) = split_capitalised_fee(bridge_debt, end_debt, input);
    let assessed_icap = assessed_icap_for(bridge_debt, input);

    let peak_debt_including_icap = input
        .maximum_loan_amount
        .min(basic.peak_debt_before_cap + fcap + assessed_icap)
        .min(basic.max_peak_debt_before_cap);

    // Anything at or below the tolerance collapses to no end debt rather
    // than being inflated up to the minimum loan amount.
    let end_debt_calc = peak_debt_including_icap - bridge_debt - assessed_icap;
    let end_debt_out = if end_debt_calc > config.tolerance {
        (input.new_property_value * input.new_property_max_lvr / dec!(100))
            .min(input.maximum_loan_amount)
            .min(end_debt_calc.max(input.minimum_loan_amount))
    } else {
        Decimal::ZERO
    };

    let check_value = end_debt_out + bridge_debt_excluding_fcap - basic.peak_debt_before_cap
        + (basic.peak_debt_before_cap + fcap + assessed_icap - peak_debt_including_icap);

    trace.record_pass(iteration, "bridge debt", bridge_debt);
    trace.record_pass(iteration, "fcap", fcap);
    trace.record_pass(iteration, "assessed icap", assessed_icap);
    trace.record_pass(iteration, "peak debt incl icap", peak_debt_including_icap);
    trace.record_pass(iteration, "end debt", end_debt_out);
    trace.record_pass(iteration, "check value", check_value);

    SolverIteration {
        iteration,
        end_debt_in: end_debt,
        bridge_debt,
        bridge_debt_excluding_fcap,
        fcap,
        assessed_icap,
        peak_debt_including_icap,
        end_debt_out,
        check_value,
    }
}

/// Bridge debt is the minimum of three candidates: the capped peak debt
/// (grossed up by the no-end-debt fee when fees capitalise), the shaded net
/// sale proceeds, and a normally-unbounded third candidate. The third only
/// bites when a capitalised bridge would leave an end debt sliver between
/// zero and the minimum loan size; it pushes the bridge down so the end
/// debt either clears the minimum or lands exactly on zero.
fn bridge_debt_for(
    end_debt: Money,
    input: &BridgingInputs,
    basic: &BasicCalculations,
    config: &CalculationConfig,
) -> Money {
    let capped_peak = basic
        .peak_debt_before_cap
        .min(basic.max_peak_debt_before_cap);
    let candidate_capped = if input.bridging_fees_capitalised {
        capped_peak + capped_peak * input.bridging_fees_no_end_debt_percent / dec!(100)
    } else {
        capped_peak
    };

    let candidate_proceeds = basic.shaded_net_sales_proceeds;

    let sliver_end_debt =
        end_debt > Decimal::ZERO && end_debt <= input.minimum_loan_amount;
    let candidate_min_loan = if candidate_capped > basic.shaded_net_sales_proceeds && sliver_end_debt
    {
        let capitalised_fee = if input.bridging_fees_capitalised {
            input.bridging_fees_end_debt_amount
        } else {
            Decimal::ZERO
        };
        basic
            .shaded_net_sales_proceeds
            .min(basic.peak_debt_before_cap)
            .min(basic.max_peak_debt_before_cap)
            + capitalised_fee
            - input.minimum_loan_amount
    } else {
        config.unbounded_candidate
    };

    candidate_capped
        .min(candidate_proceeds)
        .min(candidate_min_loan)
}

/// Split the bridge into principal and capitalised establishment fee. With
/// an end debt the fee is the fixed amount; with no end debt the fee is a
/// percentage of the bridge itself, so it sits inside the bridge
/// multiplicatively and has to be divided back out.
fn split_capitalised_fee(
    bridge_debt: Money,
    end_debt: Money,
    input: &BridgingInputs,
) -> (Money, Money) {
    if !input.bridging_fees_capitalised {
        return (bridge_debt, Decimal::ZERO);
    }

    if end_debt > Decimal::ZERO {
        let fcap = input.bridging_fees_end_debt_amount;
        (bridge_debt - fcap, fcap)
    } else {
        let excluding =
            bridge_debt / (Decimal::ONE + input.bridging_fees_no_end_debt_percent / dec!(100));
        (excluding, bridge_debt - excluding)
    }
}

/// Interest assessed over the term at the contract rate plus the servicing
/// buffer, compounding monthly. Interest-only bridges accrue nothing.
fn assessed_icap_for(bridge_debt: Money, input: &BridgingInputs) -> Money {
    match input.bridging_repayment_type {
        RepaymentType::InterestOnly => Decimal::ZERO,
        RepaymentType::Icap => {
            let monthly_rate = (input.bridging_interest_rate + input.bridge_debt_servicing_buffer)
                / dec!(100)
                / dec!(12);
            let compounded =
                (Decimal::ONE + monthly_rate).powi(input.bridging_term_months as i64);
            bridge_debt * compounded - bridge_debt
        }
    }
}
