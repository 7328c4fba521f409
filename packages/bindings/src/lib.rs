use napi::Result as NapiResult;
use napi_derive::napi;

use bridging_calc_core::bridging::{self, BridgingInputs};
use bridging_calc_core::config::CalculationConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[napi]
pub fn calculate_bridging(input_json: String) -> NapiResult<String> {
    let input: BridgingInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = CalculationConfig::default();
    let output = bridging::calculate_bridging(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_inputs(input_json: String) -> NapiResult<String> {
    let input: BridgingInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = CalculationConfig::default();
    bridging::validate_bridging_inputs(&input, &config).map_err(to_napi_error)?;
    Ok("{\"valid\":true}".to_string())
}

#[napi]
pub fn default_inputs() -> NapiResult<String> {
    serde_json::to_string(&BridgingInputs::default()).map_err(to_napi_error)
}
