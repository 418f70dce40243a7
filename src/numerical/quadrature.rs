use crate::error::EngineError;
use crate::numerical::trace::{
    IterationRecord, IterationTrace, MAX_ITERATION_CEILING, SolverResult, SolverValue,
};
use crate::symbolic::compiled::Expression;
use crate::utils::linspace;
use log::info;

/// Sampling resolution used when bounding a derivative over the interval.
const DERIVATIVE_SAMPLES: usize = 1000;

/// Composite trapezoidal rule over `[a, b]` with `n` subintervals.
///
/// The trace carries one record per subinterval: the right endpoint, the
/// cumulative partial area and a cumulative analytic error bound
/// `i·h³/12·max|f''|`, which sums to the textbook total
/// `(b-a)³/(12n²)·max|f''|`. The second derivative is obtained symbolically
/// and its maximum sampled over [`DERIVATIVE_SAMPLES`] points.
#[derive(Debug)]
pub struct Trapezoidal {
    f: Expression,
    a: f64,
    b: f64,
    n: usize,
}

impl Trapezoidal {
    pub fn new(f: Expression, a: f64, b: f64, n: usize) -> Result<Self, EngineError> {
        validate_interval(&f, a, b, n)?;
        Ok(Trapezoidal { f, a, b, n })
    }

    pub fn solve(self) -> Result<SolverResult, EngineError> {
        let h = (self.b - self.a) / self.n as f64;
        let max_second = derivative_max(&self.f, 2, self.a, self.b)?;
        let panel_bound = h.powi(3) / 12.0 * max_second;

        let mut trace = IterationTrace::new();
        let mut area = 0.0;
        let mut y_left = self.f.call(&[self.a])?;
        for i in 1..=self.n {
            let x_right = self.a + i as f64 * h;
            let y_right = self.f.call(&[x_right])?;
            area += h / 2.0 * (y_left + y_right);
            trace.push(IterationRecord::quadrature(
                i,
                x_right,
                area,
                Some(i as f64 * panel_bound),
            ));
            y_left = y_right;
        }
        info!(
            "trapezoidal rule over [{}, {}] with n = {}: area = {}, error bound = {}",
            self.a,
            self.b,
            self.n,
            area,
            self.n as f64 * panel_bound
        );
        Ok(SolverResult::converged(self.n, SolverValue::Area(area), trace))
    }
}

/// Composite Simpson rule over `[a, b]` with an even number of subintervals.
///
/// Odd `n` is rejected with [`EngineError::InvalidParameter`] rather than
/// silently rounded. One record per parabolic segment (two subintervals),
/// so the reported iteration count is `n / 2`. The cumulative error bound is
/// `s·h⁵/90·max|f⁗|`, summing to `(b-a)⁵/(180n⁴)·max|f⁗|`.
#[derive(Debug)]
pub struct Simpson {
    f: Expression,
    a: f64,
    b: f64,
    n: usize,
}

impl Simpson {
    pub fn new(f: Expression, a: f64, b: f64, n: usize) -> Result<Self, EngineError> {
        validate_interval(&f, a, b, n)?;
        if n % 2 != 0 {
            return Err(EngineError::InvalidParameter(format!(
                "Simpson's rule needs an even number of subintervals, got n = {}",
                n
            )));
        }
        Ok(Simpson { f, a, b, n })
    }

    pub fn solve(self) -> Result<SolverResult, EngineError> {
        let h = (self.b - self.a) / self.n as f64;
        let max_fourth = derivative_max(&self.f, 4, self.a, self.b)?;
        let segment_bound = h.powi(5) / 90.0 * max_fourth;

        let mut trace = IterationTrace::new();
        let mut area = 0.0;
        let segments = self.n / 2;
        for s in 1..=segments {
            let x0 = self.a + (2 * s - 2) as f64 * h;
            let x1 = self.a + (2 * s - 1) as f64 * h;
            let x2 = self.a + (2 * s) as f64 * h;
            let y0 = self.f.call(&[x0])?;
            let y1 = self.f.call(&[x1])?;
            let y2 = self.f.call(&[x2])?;
            area += h / 3.0 * (y0 + 4.0 * y1 + y2);
            trace.push(IterationRecord::quadrature(
                s,
                x2,
                area,
                Some(s as f64 * segment_bound),
            ));
        }
        info!(
            "simpson rule over [{}, {}] with n = {}: area = {}, error bound = {}",
            self.a,
            self.b,
            self.n,
            area,
            segments as f64 * segment_bound
        );
        Ok(SolverResult::converged(segments, SolverValue::Area(area), trace))
    }
}

fn validate_interval(f: &Expression, a: f64, b: f64, n: usize) -> Result<(), EngineError> {
    if f.arity() != 1 {
        return Err(EngineError::DimensionMismatch(format!(
            "quadrature expects a single-variable integrand, got {} variables",
            f.arity()
        )));
    }
    if !(a < b) {
        return Err(EngineError::InvalidParameter(format!(
            "integration bounds must satisfy a < b, got a = {}, b = {}",
            a, b
        )));
    }
    if n == 0 || n > MAX_ITERATION_CEILING {
        return Err(EngineError::InvalidParameter(format!(
            "subinterval count must be in 1..={}, got n = {}",
            MAX_ITERATION_CEILING, n
        )));
    }
    Ok(())
}

/// Maximum of `|d^order f / dx^order|` over `[a, b]`, sampled on a uniform
/// grid. Not a guaranteed supremum, but the bound policy applied uniformly
/// across both rules.
fn derivative_max(
    f: &Expression,
    order: usize,
    a: f64,
    b: f64,
) -> Result<f64, EngineError> {
    let var = f.variables()[0].clone();
    let mut derivative = f.clone();
    for _ in 0..order {
        derivative = derivative.differentiate(&var);
    }
    let mut max = 0.0f64;
    for x in linspace(a, b, DERIVATIVE_SAMPLES) {
        max = max.max(derivative.call(&[x])?.abs());
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::trace::SolverStatus;
    use approx::assert_relative_eq;

    fn integrand(formula: &str) -> Expression {
        Expression::compile(formula, &["x"]).unwrap()
    }

    #[test]
    fn trapezoid_overestimates_a_parabola_by_exactly_the_bound() {
        let result = Trapezoidal::new(integrand("x^2"), 0.0, 2.0, 4)
            .unwrap()
            .solve()
            .unwrap();
        let SolverValue::Area(area) = result.value else {
            panic!("expected an area");
        };
        // h = 0.5: 0.25 * (0 + 2*0.25 + 2*1 + 2*2.25 + 4)
        assert_relative_eq!(area, 2.75, epsilon = 1e-12);
        // f'' = 2 everywhere, so the bound (b-a)^3/(12 n^2) * 2 = 1/12 is
        // attained exactly
        let bound = result.trace.records().last().unwrap().error.unwrap();
        assert_relative_eq!(bound, 1.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(area - 8.0 / 3.0, bound, epsilon = 1e-12);
    }

    #[test]
    fn trapezoid_is_exact_for_linear_integrands() {
        let result = Trapezoidal::new(integrand("3x + 1"), 0.0, 2.0, 5)
            .unwrap()
            .solve()
            .unwrap();
        let SolverValue::Area(area) = result.value else {
            panic!("expected an area");
        };
        assert_relative_eq!(area, 8.0, epsilon = 1e-12);
        assert_eq!(result.trace.records().last().unwrap().error, Some(0.0));
    }

    #[test]
    fn simpson_integrates_a_parabola_exactly() {
        let result = Simpson::new(integrand("x^2"), 0.0, 2.0, 4)
            .unwrap()
            .solve()
            .unwrap();
        let SolverValue::Area(area) = result.value else {
            panic!("expected an area");
        };
        assert_relative_eq!(area, 8.0 / 3.0, epsilon = 1e-4);
        assert_eq!(result.status, SolverStatus::Converged);
        // one record per parabolic segment
        assert_eq!(result.iterations, 2);
        assert_eq!(result.trace.len(), 2);
    }

    #[test]
    fn simpson_rejects_odd_subinterval_counts() {
        let err = Simpson::new(integrand("x^2"), 0.0, 1.0, 3).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }

    #[test]
    fn rejects_degenerate_intervals_and_zero_subintervals() {
        assert!(matches!(
            Trapezoidal::new(integrand("x"), 1.0, 1.0, 4).unwrap_err(),
            EngineError::InvalidParameter(_)
        ));
        assert!(matches!(
            Trapezoidal::new(integrand("x"), 0.0, 1.0, 0).unwrap_err(),
            EngineError::InvalidParameter(_)
        ));
    }

    #[test]
    fn partial_areas_accumulate_monotonically_for_positive_integrands() {
        let result = Trapezoidal::new(integrand("exp(x)"), 0.0, 1.0, 10)
            .unwrap()
            .solve()
            .unwrap();
        let partials: Vec<f64> = result
            .trace
            .records()
            .iter()
            .map(|r| r.partial_area.unwrap())
            .collect();
        assert_eq!(partials.len(), 10);
        assert!(partials.windows(2).all(|w| w[0] < w[1]));
        let SolverValue::Area(area) = result.value else {
            panic!("expected an area");
        };
        assert_relative_eq!(*partials.last().unwrap(), area);
        assert_relative_eq!(area, std::f64::consts::E - 1.0, epsilon = 1e-2);
    }

    #[test]
    fn sine_area_lands_within_the_reported_bound() {
        let result = Trapezoidal::new(integrand("sin(x)"), 0.0, std::f64::consts::PI, 100)
            .unwrap()
            .solve()
            .unwrap();
        let SolverValue::Area(area) = result.value else {
            panic!("expected an area");
        };
        let bound = result.trace.records().last().unwrap().error.unwrap();
        assert!((area - 2.0).abs() <= bound);
    }

    #[test]
    fn domain_errors_in_the_integrand_surface_as_errors() {
        let result = Trapezoidal::new(integrand("ln(x)"), -1.0, 1.0, 4)
            .unwrap()
            .solve();
        assert!(matches!(result, Err(EngineError::Domain(_))));
    }
}
