use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::CalculationConfig;
use crate::error::BridgingError;
use crate::types::{Money, Percent};
use crate::BridgingResult;

/// How interest on the bridge is treated during the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentType {
    /// Interest is serviced monthly; nothing accrues onto the principal.
    InterestOnly,
    /// Interest capitalises onto the bridge and clears from sale proceeds.
    #[serde(rename = "ICAP")]
    Icap,
}

/// Input record for a single bridging calculation.
///
/// Monetary fields are non-negative; percentage fields are whole-number
/// percentages (7.5 means 7.5%). The engine assumes these hold and performs
/// no range checks of its own; run [`validate_bridging_inputs`] at the call
/// site first.
///
/// Policy fields default to the production lending policy, so a caller (or
/// a JSON document) only needs to supply the scenario-specific fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgingInputs {
    // --- Existing property ---
    pub existing_property_value: Money,
    /// Debt currently secured against the existing property
    pub existing_debt: Money,
    /// Agent/legal costs of the sale, as a percent of the existing value
    pub selling_costs_percent: Percent,
    /// A contract of sale exists for the existing property
    pub contract_of_sale_provided: bool,
    /// Sale proceeds the borrower keeps back rather than paying down debt
    pub sales_proceeds_to_retain: Money,

    // --- Price guarantee ---
    pub pg_included: bool,
    pub pg_fee_amount: Money,
    pub pg_fee_capitalised: bool,

    // --- New property ---
    pub new_property_value: Money,
    /// Stamp duty and transaction costs, as a percent of the new value
    pub purchase_costs_percent: Percent,
    pub purchase_costs_capitalised: bool,
    /// Extra borrowings on top of the purchase (renovations, payout, etc.)
    pub additional_borrowings: Money,
    /// Savings the borrower contributes to the purchase
    pub savings: Money,

    // --- Bridging product ---
    pub bridging_term_months: u32,
    pub bridging_repayment_type: RepaymentType,
    /// Annual contract rate, percent
    pub bridging_interest_rate: Percent,
    /// Establishment fee when no end debt remains, percent of the bridge
    pub bridging_fees_no_end_debt_percent: Percent,
    /// Establishment fee when an end debt remains, fixed amount
    pub bridging_fees_end_debt_amount: Money,
    pub bridging_fees_capitalised: bool,

    // --- Policy assumptions ---
    pub peak_debt_max_lvr_with_cos: Percent,
    pub peak_debt_max_lvr_without_cos: Percent,
    /// Conservative discount applied to the existing valuation, percent
    pub existing_property_valuation_shading: Percent,
    pub new_property_max_lvr: Percent,
    /// Buffer over the contract rate when assessing capitalised interest
    pub bridge_debt_servicing_buffer: Percent,
    pub minimum_loan_amount: Money,
    pub maximum_loan_amount: Money,
}

impl Default for BridgingInputs {
    fn default() -> Self {
        BridgingInputs {
            existing_property_value: Decimal::ZERO,
            existing_debt: Decimal::ZERO,
            selling_costs_percent: Decimal::ZERO,
            contract_of_sale_provided: false,
            sales_proceeds_to_retain: Decimal::ZERO,
            pg_included: false,
            pg_fee_amount: dec!(7500),
            pg_fee_capitalised: false,
            new_property_value: Decimal::ZERO,
            purchase_costs_percent: Decimal::ZERO,
            purchase_costs_capitalised: true,
            additional_borrowings: Decimal::ZERO,
            savings: Decimal::ZERO,
            bridging_term_months: 6,
            bridging_repayment_type: RepaymentType::InterestOnly,
            bridging_interest_rate: Decimal::ZERO,
            bridging_fees_no_end_debt_percent: dec!(0.75),
            bridging_fees_end_debt_amount: dec!(1500),
            bridging_fees_capitalised: false,
            peak_debt_max_lvr_with_cos: dec!(85),
            peak_debt_max_lvr_without_cos: dec!(80),
            existing_property_valuation_shading: dec!(5),
            new_property_max_lvr: dec!(85),
            bridge_debt_servicing_buffer: dec!(1),
            minimum_loan_amount: dec!(100000),
            maximum_loan_amount: dec!(3000000),
        }
    }
}

/// Range checks the engine itself never performs. Form-level validation is
/// the caller's job (CLI, bindings, or the hosting UI); the engine computes
/// whatever it is handed.
pub fn validate_bridging_inputs(
    input: &BridgingInputs,
    config: &CalculationConfig,
) -> BridgingResult<()> {
    if input.bridging_term_months < config.min_term_months
        || input.bridging_term_months > config.max_term_months
    {
        return Err(BridgingError::InvalidInput {
            field: "bridging_term_months".into(),
            reason: format!(
                "Term must be between {} and {} months",
                config.min_term_months, config.max_term_months
            ),
        });
    }

    let monetary = [
        ("existing_property_value", input.existing_property_value),
        ("existing_debt", input.existing_debt),
        ("sales_proceeds_to_retain", input.sales_proceeds_to_retain),
        ("pg_fee_amount", input.pg_fee_amount),
        ("new_property_value", input.new_property_value),
        ("additional_borrowings", input.additional_borrowings),
        ("savings", input.savings),
        (
            "bridging_fees_end_debt_amount",
            input.bridging_fees_end_debt_amount,
        ),
        ("minimum_loan_amount", input.minimum_loan_amount),
        ("maximum_loan_amount", input.maximum_loan_amount),
    ];
    for (field, value) in monetary {
        if value < Decimal::ZERO {
            return Err(BridgingError::InvalidInput {
                field: field.into(),
                reason: "Monetary amounts must be non-negative".into(),
            });
        }
    }

    let percentages = [
        ("selling_costs_percent", input.selling_costs_percent),
        ("purchase_costs_percent", input.purchase_costs_percent),
        ("bridging_interest_rate", input.bridging_interest_rate),
        (
            "bridging_fees_no_end_debt_percent",
            input.bridging_fees_no_end_debt_percent,
        ),
        ("peak_debt_max_lvr_with_cos", input.peak_debt_max_lvr_with_cos),
        (
            "peak_debt_max_lvr_without_cos",
            input.peak_debt_max_lvr_without_cos,
        ),
        (
            "existing_property_valuation_shading",
            input.existing_property_valuation_shading,
        ),
        ("new_property_max_lvr", input.new_property_max_lvr),
        (
            "bridge_debt_servicing_buffer",
            input.bridge_debt_servicing_buffer,
        ),
    ];
    for (field, value) in percentages {
        if value < Decimal::ZERO {
            return Err(BridgingError::InvalidInput {
                field: field.into(),
                reason: "Percentages must be non-negative".into(),
            });
        }
    }

    if input.maximum_loan_amount < input.minimum_loan_amount {
        return Err(BridgingError::InvalidInput {
            field: "maximum_loan_amount".into(),
            reason: "Maximum loan amount must not be below the minimum".into(),
        });
    }

    Ok(())
}
