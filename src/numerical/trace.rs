use serde::Serialize;
use strum_macros::Display;

/// Hard ceiling on iteration counts, enforced unconditionally in every
/// solver loop. Doubles as the cancellation mechanism: no cooperative
/// signal exists inside a single solve.
pub const MAX_ITERATION_CEILING: usize = 1000;

/// Convergence threshold used when a request does not override it.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Iterates beyond this magnitude are treated as divergence.
pub const DIVERGENCE_BOUND: f64 = 1e12;

/// Iteration budget and convergence threshold for a single solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl ToleranceConfig {
    /// Clamps `max_iterations` into `1..=MAX_ITERATION_CEILING` regardless
    /// of what the caller asked for.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        ToleranceConfig {
            max_iterations: max_iterations.clamp(1, MAX_ITERATION_CEILING),
            tolerance,
        }
    }
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        ToleranceConfig::new(100, DEFAULT_TOLERANCE)
    }
}

/// Scalar or vector iterate, serialized without a tag so scalar methods
/// report `"x": 1.5` and system methods `"x": [1.5, -0.3]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Iterate {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// One step of a method's progress. Immutable once appended to a trace.
///
/// `iteration` is 1-based and strictly increasing; `error` is always part of
/// the record shape (nullable) so consumers can treat all method families
/// uniformly; the remaining fields are populated per family and omitted
/// from the JSON otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub x: Iterate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_next: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_next: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_predictor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_area: Option<f64>,
    pub error: Option<f64>,
}

impl IterationRecord {
    fn base(iteration: usize, x: Iterate, error: Option<f64>) -> Self {
        IterationRecord {
            iteration,
            x,
            fx: None,
            y: None,
            slope: None,
            x_next: None,
            y_next: None,
            y_predictor: None,
            slope2: None,
            partial_area: None,
            error,
        }
    }

    /// Record for the single-variable root finders.
    pub fn scalar(iteration: usize, x: f64, fx: Option<f64>, error: f64) -> Self {
        let mut record = Self::base(iteration, Iterate::Scalar(x), Some(error));
        record.fx = fx;
        record
    }

    /// Per-iteration vector snapshot for the system solvers.
    pub fn vector(iteration: usize, x: Vec<f64>, error: f64) -> Self {
        Self::base(iteration, Iterate::Vector(x), Some(error))
    }

    /// Cumulative partial area for the quadrature rules; `x` is the right
    /// endpoint of the covered subinterval.
    pub fn quadrature(iteration: usize, x: f64, partial_area: f64, error: Option<f64>) -> Self {
        let mut record = Self::base(iteration, Iterate::Scalar(x), error);
        record.partial_area = Some(partial_area);
        record
    }

    /// One explicit Euler step.
    pub fn ode_step(
        iteration: usize,
        x: f64,
        y: f64,
        slope: f64,
        x_next: f64,
        y_next: f64,
        error: Option<f64>,
    ) -> Self {
        let mut record = Self::base(iteration, Iterate::Scalar(x), error);
        record.y = Some(y);
        record.slope = Some(slope);
        record.x_next = Some(x_next);
        record.y_next = Some(y_next);
        record
    }
}

/// Ordered sequence of iteration records; insertion order is execution
/// order, never reordered or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IterationTrace {
    records: Vec<IterationRecord>,
}

impl IterationTrace {
    pub fn new() -> Self {
        IterationTrace::default()
    }

    pub fn push(&mut self, record: IterationRecord) {
        debug_assert_eq!(record.iteration, self.records.len() + 1);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<IterationRecord> {
        self.records
    }
}

/// Lifecycle of a solve: `Initialized` and `Running` are the in-flight
/// states, the other three are terminal. Solvers consume themselves in
/// `solve`, so a terminal state can never be re-entered; precondition and
/// runtime failures surface as `EngineError` (the `Failed` state) rather
/// than as a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SolverStatus {
    Initialized,
    Running,
    Converged,
    MaxIterationsReached,
    Failed,
}

/// Final iterate of a solver run, one shape per method family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SolverValue {
    Root(f64),
    Solution(Vec<f64>),
    Area(f64),
    FinalPoint { x: f64, y: f64 },
}

/// Final outcome of a solver run, consumed exactly once by the response
/// assembler. The trace length always equals `iterations`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    pub status: SolverStatus,
    pub converged: bool,
    pub iterations: usize,
    pub value: SolverValue,
    pub trace: IterationTrace,
}

impl SolverResult {
    pub fn converged(iterations: usize, value: SolverValue, trace: IterationTrace) -> Self {
        debug_assert_eq!(trace.len(), iterations);
        SolverResult {
            status: SolverStatus::Converged,
            converged: true,
            iterations,
            value,
            trace,
        }
    }

    /// Reaching the ceiling is a valid terminal state, not an error: the
    /// best estimate is returned with `converged = false`.
    pub fn exhausted(iterations: usize, value: SolverValue, trace: IterationTrace) -> Self {
        debug_assert_eq!(trace.len(), iterations);
        SolverResult {
            status: SolverStatus::MaxIterationsReached,
            converged: false,
            iterations,
            value,
            trace,
        }
    }
}
