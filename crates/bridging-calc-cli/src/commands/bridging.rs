use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use bridging_calc_core::bridging::{
    calculate_bridging, validate_bridging_inputs, BridgingInputs, RepaymentType,
};
use bridging_calc_core::config::CalculationConfig;
use bridging_calc_core::trace::render_trace;

use crate::input;

/// Repayment type as a command-line value.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RepaymentArg {
    InterestOnly,
    Icap,
}

impl From<RepaymentArg> for RepaymentType {
    fn from(arg: RepaymentArg) -> Self {
        match arg {
            RepaymentArg::InterestOnly => RepaymentType::InterestOnly,
            RepaymentArg::Icap => RepaymentType::Icap,
        }
    }
}

/// Arguments for a bridging calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CalculateArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Existing property value
    #[arg(long)]
    pub existing_property_value: Option<Decimal>,

    /// Debt outstanding against the existing property
    #[arg(long)]
    pub existing_debt: Option<Decimal>,

    /// Selling costs as a percent of the existing value (e.g. 2.5)
    #[arg(long)]
    pub selling_costs_percent: Option<Decimal>,

    /// A contract of sale exists for the existing property
    #[arg(long)]
    pub contract_of_sale: bool,

    /// Sale proceeds the borrower keeps back
    #[arg(long)]
    pub sales_proceeds_to_retain: Option<Decimal>,

    /// New property value
    #[arg(long)]
    pub new_property_value: Option<Decimal>,

    /// Purchase costs as a percent of the new value
    #[arg(long)]
    pub purchase_costs_percent: Option<Decimal>,

    /// Pay purchase costs in cash instead of capitalising them
    #[arg(long)]
    pub purchase_costs_in_cash: bool,

    /// Additional borrowings on top of the purchase
    #[arg(long)]
    pub additional_borrowings: Option<Decimal>,

    /// Savings contributed to the purchase
    #[arg(long)]
    pub savings: Option<Decimal>,

    /// Bridging term in months (1-12)
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Repayment type during the bridging term
    #[arg(long, value_enum)]
    pub repayment_type: Option<RepaymentArg>,

    /// Annual bridging interest rate in percent (e.g. 7 for 7%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Capitalise bridging fees onto the loan
    #[arg(long)]
    pub fees_capitalised: bool,

    /// Print the diagnostic trace to stderr after the result
    #[arg(long)]
    pub show_trace: bool,
}

/// Arguments for input validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs: BridgingInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        inputs_from_flags(&args)?
    };

    let config = CalculationConfig::default();

    // Range validation is this side of the boundary; the engine computes
    // whatever it is handed
    validate_bridging_inputs(&inputs, &config)?;

    let result = calculate_bridging(&inputs, &config)?;

    if args.show_trace {
        eprint!("{}", render_trace(&result.result.trace));
    }

    Ok(serde_json::to_value(result)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs: BridgingInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("provide --input or pipe JSON on stdin".into());
    };

    validate_bridging_inputs(&inputs, &CalculationConfig::default())?;

    Ok(serde_json::json!({ "valid": true }))
}

pub fn run_defaults() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::json!({
        "inputs": BridgingInputs::default(),
        "config": CalculationConfig::default(),
    }))
}

fn inputs_from_flags(args: &CalculateArgs) -> Result<BridgingInputs, Box<dyn std::error::Error>> {
    let defaults = BridgingInputs::default();

    Ok(BridgingInputs {
        existing_property_value: args
            .existing_property_value
            .ok_or("--existing-property-value is required (or provide --input)")?,
        existing_debt: args.existing_debt.unwrap_or(dec!(0)),
        selling_costs_percent: args.selling_costs_percent.unwrap_or(dec!(0)),
        contract_of_sale_provided: args.contract_of_sale,
        sales_proceeds_to_retain: args.sales_proceeds_to_retain.unwrap_or(dec!(0)),
        new_property_value: args
            .new_property_value
            .ok_or("--new-property-value is required (or provide --input)")?,
        purchase_costs_percent: args.purchase_costs_percent.unwrap_or(dec!(0)),
        purchase_costs_capitalised: !args.purchase_costs_in_cash,
        additional_borrowings: args.additional_borrowings.unwrap_or(dec!(0)),
        savings: args.savings.unwrap_or(dec!(0)),
        bridging_term_months: args.term_months.unwrap_or(defaults.bridging_term_months),
        bridging_repayment_type: args
            .repayment_type
            .map(Into::into)
            .unwrap_or(defaults.bridging_repayment_type),
        bridging_interest_rate: args
            .interest_rate
            .ok_or("--interest-rate is required (or provide --input)")?,
        bridging_fees_capitalised: args.fees_capitalised,
        ..defaults
    })
}
