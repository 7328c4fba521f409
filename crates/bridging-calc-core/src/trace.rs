use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stage of the calculation a step was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    Basic,
    Solver,
    Metrics,
}

/// One recorded calculation step. Steps are ordered as computed, so the
/// sequence reads as a worked example of the whole calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub stage: TraceStage,
    /// Solver pass the step belongs to; absent for stages A and C.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u32>,
    pub label: String,
    pub value: Decimal,
}

/// Per-call step accumulator. Created fresh inside `calculate_bridging` and
/// consumed into the result, so the engine holds no state across calls.
#[derive(Debug)]
pub struct Trace {
    steps: Vec<TraceStep>,
    enabled: bool,
}

impl Trace {
    pub fn new(enabled: bool) -> Self {
        Trace {
            steps: Vec::new(),
            enabled,
        }
    }

    pub fn record(&mut self, stage: TraceStage, label: &str, value: Decimal) {
        if self.enabled {
            self.steps.push(TraceStep {
                stage,
                iteration: None,
                label: label.to_string(),
                value,
            });
        }
    }

    pub fn record_pass(&mut self, iteration: u32, label: &str, value: Decimal) {
        if self.enabled {
            self.steps.push(TraceStep {
                stage: TraceStage::Solver,
                iteration: Some(iteration),
                label: label.to_string(),
                value,
            });
        }
    }

    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

/// Render recorded steps as human-readable text, one step per line with
/// values rounded to cents. Consumers wanting JSON serialize the steps
/// directly instead.
pub fn render_trace(steps: &[TraceStep]) -> String {
    let mut out = String::new();
    for step in steps {
        let value = step.value.round_dp(2);
        match step.iteration {
            Some(pass) => {
                out.push_str(&format!("[pass {pass}] {} = {value}\n", step.label));
            }
            None => {
                let stage = match step.stage {
                    TraceStage::Basic => "basic",
                    TraceStage::Solver => "solver",
                    TraceStage::Metrics => "metrics",
                };
                out.push_str(&format!("[{stage}] {} = {value}\n", step.label));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_disabled_trace_records_nothing() {
        let mut trace = Trace::new(false);
        trace.record(TraceStage::Basic, "selling costs", dec!(12500));
        trace.record_pass(1, "bridge debt", dec!(950000));
        assert!(trace.into_steps().is_empty());
    }

    #[test]
    fn test_render_orders_and_rounds() {
        let mut trace = Trace::new(true);
        trace.record(TraceStage::Basic, "shaded valuation", dec!(950000.456));
        trace.record_pass(2, "end debt", dec!(100000));
        let rendered = render_trace(&trace.into_steps());
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("[basic] shaded valuation = 950000.46"));
        assert_eq!(lines.next(), Some("[pass 2] end debt = 100000"));
    }
}
