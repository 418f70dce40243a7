use crate::error::EngineError;
use crate::numerical::trace::{IterationRecord, SolverResult, SolverValue};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Success or failure payload, serialized without a tag so the caller sees
/// either the result fields or `{ "error": ... }`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SolveResponse {
    Success(SolveSuccess),
    Failure(SolveFailure),
}

/// Result payload: `converged`, `iterations`, exactly one of `root` /
/// `solution` / `area` / `final_point`, the per-iteration history and a
/// chart description.
#[derive(Debug, Serialize)]
pub struct SolveSuccess {
    pub converged: bool,
    pub iterations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<f64>,
    /// Variable name → value, in the declared variable order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_point: Option<FinalPoint>,
    pub iteration_history: Vec<IterationRecord>,
    pub plot_json: String,
}

#[derive(Debug, Serialize)]
pub struct FinalPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct SolveFailure {
    pub error: String,
}

impl SolveResponse {
    /// Maps a solver outcome onto the wire shape. `variables` is consulted
    /// only for vector solutions, to key the name → value map.
    pub fn success(result: SolverResult, variables: &[String], plot_json: String) -> Self {
        let mut success = SolveSuccess {
            converged: result.converged,
            iterations: result.iterations,
            root: None,
            solution: None,
            area: None,
            final_point: None,
            iteration_history: result.trace.into_records(),
            plot_json,
        };
        match result.value {
            SolverValue::Root(root) => success.root = Some(root),
            SolverValue::Solution(values) => {
                let mut map = Map::new();
                for (name, value) in variables.iter().zip(values) {
                    map.insert(name.clone(), json!(value));
                }
                success.solution = Some(map);
            }
            SolverValue::Area(area) => success.area = Some(area),
            SolverValue::FinalPoint { x, y } => {
                success.final_point = Some(FinalPoint { x, y })
            }
        }
        SolveResponse::Success(success)
    }

    pub fn failure(err: EngineError) -> Self {
        SolveResponse::Failure(SolveFailure {
            error: err.to_string(),
        })
    }
}
