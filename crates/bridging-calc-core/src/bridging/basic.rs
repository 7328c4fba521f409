use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bridging::inputs::BridgingInputs;
use crate::trace::{Trace, TraceStage};
use crate::types::{Money, Percent};

/// Values derived once per calculation, before the solver runs. Plain
/// formulas; evaluation order only matters for the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicCalculations {
    /// Costs of selling the existing property
    pub selling_costs_amount: Money,
    /// Usable equity in the existing property at the with-contract LVR cap
    pub existing_property_equity: Money,
    /// Existing valuation after conservative shading
    pub shaded_valuation: Money,
    /// Shaded valuation net of selling costs and retained proceeds
    pub shaded_net_sales_proceeds: Money,
    /// Transaction costs on the new purchase
    pub purchase_costs_amount: Money,
    /// Funding the purchase needs on top of what the borrower brings
    pub additional_funds_required: Money,
    /// Combined debt at its peak, before any cap applies
    pub peak_debt_before_cap: Money,
    /// New property value plus the shaded existing valuation
    pub peak_shaded_valuation: Money,
    /// LVR cap selected by the contract-of-sale flag
    pub lvr_to_use: Percent,
    /// LVR-capped peak debt, also bounded by the maximum loan amount
    pub max_peak_debt_before_cap: Money,
}

pub(crate) fn derive_basic(input: &BridgingInputs, trace: &mut Trace) -> BasicCalculations {
    let hundred = dec!(100);

    let selling_costs_amount = input.existing_property_value * input.selling_costs_percent / hundred;
    let existing_property_equity =
        input.existing_property_value * input.peak_debt_max_lvr_with_cos / hundred
            - input.existing_debt;
    let shaded_valuation = input.existing_property_value
        * (Decimal::ONE - input.existing_property_valuation_shading / hundred);
    let shaded_net_sales_proceeds =
        shaded_valuation - selling_costs_amount - input.sales_proceeds_to_retain;
    let purchase_costs_amount = input.new_property_value * input.purchase_costs_percent / hundred;

    let capitalised_purchase_costs = if input.purchase_costs_capitalised {
        purchase_costs_amount
    } else {
        Decimal::ZERO
    };
    let capitalised_pg_fee = if input.pg_included && input.pg_fee_capitalised {
        input.pg_fee_amount
    } else {
        Decimal::ZERO
    };
    let additional_funds_required = input.new_property_value + capitalised_purchase_costs
        + input.additional_borrowings
        - input.savings
        + capitalised_pg_fee;

    let peak_debt_before_cap = additional_funds_required + input.existing_debt;
    let peak_shaded_valuation = input.new_property_value + shaded_valuation;

    let lvr_to_use = if input.contract_of_sale_provided {
        input.peak_debt_max_lvr_with_cos
    } else {
        input.peak_debt_max_lvr_without_cos
    };
    let max_peak_debt_before_cap =
        (peak_shaded_valuation * lvr_to_use / hundred).min(input.maximum_loan_amount);

    trace.record(TraceStage::Basic, "selling costs", selling_costs_amount);
    trace.record(
        TraceStage::Basic,
        "existing property equity",
        existing_property_equity,
    );
    trace.record(TraceStage::Basic, "shaded valuation", shaded_valuation);
    trace.record(
        TraceStage::Basic,
        "shaded net sales proceeds",
        shaded_net_sales_proceeds,
    );
    trace.record(TraceStage::Basic, "purchase costs", purchase_costs_amount);
    trace.record(
        TraceStage::Basic,
        "additional funds required",
        additional_funds_required,
    );
    trace.record(
        TraceStage::Basic,
        "peak debt before cap",
        peak_debt_before_cap,
    );
    trace.record(
        TraceStage::Basic,
        "peak shaded valuation",
        peak_shaded_valuation,
    );
    trace.record(TraceStage::Basic, "lvr to use", lvr_to_use);
    trace.record(
        TraceStage::Basic,
        "max peak debt before cap",
        max_peak_debt_before_cap,
    );

    BasicCalculations {
        selling_costs_amount,
        existing_property_equity,
        shaded_valuation,
        shaded_net_sales_proceeds,
        purchase_costs_amount,
        additional_funds_required,
        peak_debt_before_cap,
        peak_shaded_valuation,
        lvr_to_use,
        max_peak_debt_before_cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridging::inputs::RepaymentType;

    /// Reference scenario: $1M existing property with $400k debt, $800k
    /// purchase funded by $300k savings plus $50k extra borrowings.
    fn sample_inputs() -> BridgingInputs {
        BridgingInputs {
            existing_property_value: dec!(1000000),
            existing_debt: dec!(400000),
            selling_costs_percent: dec!(0),
            contract_of_sale_provided: false,
            sales_proceeds_to_retain: dec!(0),
            pg_included: false,
            pg_fee_amount: dec!(7500),
            pg_fee_capitalised: true,
            new_property_value: dec!(800000),
            purchase_costs_percent: dec!(0),
            purchase_costs_capitalised: true,
            additional_borrowings: dec!(50000),
            savings: dec!(300000),
            bridging_term_months: 12,
            bridging_repayment_type: RepaymentType::Icap,
            bridging_interest_rate: dec!(7),
            bridging_fees_no_end_debt_percent: dec!(0.75),
            bridging_fees_end_debt_amount: dec!(1500),
            bridging_fees_capitalised: false,
            ..BridgingInputs::default()
        }
    }

    fn derive(input: &BridgingInputs) -> BasicCalculations {
        let mut trace = Trace::new(false);
        derive_basic(input, &mut trace)
    }

    #[test]
    fn test_reference_scenario_values() {
        let basic = derive(&sample_inputs());

        assert_eq!(basic.selling_costs_amount, dec!(0));
        // 1,000,000 * 85% - 400,000
        assert_eq!(basic.existing_property_equity, dec!(450000));
        // 1,000,000 * (1 - 5%)
        assert_eq!(basic.shaded_valuation, dec!(950000));
        assert_eq!(basic.shaded_net_sales_proceeds, dec!(950000));
        assert_eq!(basic.purchase_costs_amount, dec!(0));
        // 800,000 + 50,000 - 300,000
        assert_eq!(basic.additional_funds_required, dec!(550000));
        assert_eq!(basic.peak_debt_before_cap, dec!(950000));
        assert_eq!(basic.peak_shaded_valuation, dec!(1750000));
        // No contract of sale
        assert_eq!(basic.lvr_to_use, dec!(80));
        // 1,750,000 * 80% < 3,000,000
        assert_eq!(basic.max_peak_debt_before_cap, dec!(1400000));
    }

    #[test]
    fn test_contract_of_sale_selects_higher_lvr() {
        let mut inputs = sample_inputs();
        inputs.contract_of_sale_provided = true;
        let basic = derive(&inputs);

        assert_eq!(basic.lvr_to_use, dec!(85));
        assert_eq!(basic.max_peak_debt_before_cap, dec!(1487500));
    }

    #[test]
    fn test_maximum_loan_caps_peak_debt() {
        let mut inputs = sample_inputs();
        inputs.maximum_loan_amount = dec!(1200000);
        let basic = derive(&inputs);

        assert_eq!(basic.max_peak_debt_before_cap, dec!(1200000));
    }

    #[test]
    fn test_uncapitalised_costs_stay_out_of_funds_required() {
        let mut inputs = sample_inputs();
        inputs.purchase_costs_percent = dec!(5);
        inputs.purchase_costs_capitalised = false;
        let basic = derive(&inputs);

        assert_eq!(basic.purchase_costs_amount, dec!(40000));
        // Costs paid in cash never enter the peak debt
        assert_eq!(basic.additional_funds_required, dec!(550000));
    }

    #[test]
    fn test_capitalised_costs_and_pg_fee_enter_funds_required() {
        let mut inputs = sample_inputs();
        inputs.purchase_costs_percent = dec!(5);
        inputs.pg_included = true;
        let basic = derive(&inputs);

        // 550,000 + 40,000 costs + 7,500 PG fee
        assert_eq!(basic.additional_funds_required, dec!(597500));
        assert_eq!(basic.peak_debt_before_cap, dec!(997500));
    }

    #[test]
    fn test_selling_costs_and_retained_proceeds_reduce_net() {
        let mut inputs = sample_inputs();
        inputs.selling_costs_percent = dec!(2);
        inputs.sales_proceeds_to_retain = dec!(30000);
        let basic = derive(&inputs);

        assert_eq!(basic.selling_costs_amount, dec!(20000));
        // 950,000 - 20,000 - 30,000
        assert_eq!(basic.shaded_net_sales_proceeds, dec!(900000));
    }
}
