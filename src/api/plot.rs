//! Chart descriptions derived from iteration traces. The output mirrors the
//! plotly figure shape (`data` traces plus a `layout`) so a browser client
//! can hand it straight to a renderer; the engine itself treats it as an
//! opaque string.

use crate::numerical::trace::{Iterate, IterationRecord};
use serde_json::{Value, json};

fn figure(title: &str, x_label: &str, y_label: &str, data: Vec<Value>) -> String {
    json!({
        "data": data,
        "layout": {
            "title": title,
            "xaxis": { "title": x_label },
            "yaxis": { "title": y_label },
        },
    })
    .to_string()
}

fn scalar_x(record: &IterationRecord) -> f64 {
    match &record.x {
        Iterate::Scalar(value) => *value,
        Iterate::Vector(values) => values.first().copied().unwrap_or(f64::NAN),
    }
}

/// Iterate-per-iteration convergence series for the single-variable root
/// finders, with the error alongside.
pub fn scalar_convergence(method: &str, records: &[IterationRecord]) -> String {
    let iterations: Vec<usize> = records.iter().map(|r| r.iteration).collect();
    let iterates: Vec<f64> = records.iter().map(scalar_x).collect();
    let errors: Vec<Value> = records
        .iter()
        .map(|r| json!(r.error))
        .collect();
    figure(
        &format!("{} convergence", method),
        "iteration",
        "value",
        vec![
            json!({ "name": "x", "x": iterations, "y": iterates, "mode": "lines+markers" }),
            json!({ "name": "error", "x": iterations, "y": errors, "mode": "lines" }),
        ],
    )
}

/// One convergence series per declared variable for the system solvers.
pub fn vector_convergence(
    method: &str,
    records: &[IterationRecord],
    variables: &[String],
) -> String {
    let iterations: Vec<usize> = records.iter().map(|r| r.iteration).collect();
    let data = variables
        .iter()
        .enumerate()
        .map(|(k, name)| {
            let series: Vec<Value> = records
                .iter()
                .map(|r| match &r.x {
                    Iterate::Vector(values) => json!(values.get(k)),
                    Iterate::Scalar(value) => json!(value),
                })
                .collect();
            json!({ "name": name, "x": iterations, "y": series, "mode": "lines+markers" })
        })
        .collect();
    figure(
        &format!("{} convergence", method),
        "iteration",
        "value",
        data,
    )
}

/// Cumulative partial area against the right endpoint of each subinterval.
pub fn cumulative_area(method: &str, records: &[IterationRecord]) -> String {
    let endpoints: Vec<f64> = records.iter().map(scalar_x).collect();
    let areas: Vec<Value> = records.iter().map(|r| json!(r.partial_area)).collect();
    figure(
        &format!("{} cumulative area", method),
        "x",
        "area",
        vec![json!({ "name": "partial area", "x": endpoints, "y": areas, "mode": "lines+markers" })],
    )
}

/// The computed `(x, y)` polyline of an Euler run, including the initial
/// point and the final step's endpoint.
pub fn ode_polyline(method: &str, records: &[IterationRecord]) -> String {
    let mut xs: Vec<Value> = Vec::with_capacity(records.len() + 1);
    let mut ys: Vec<Value> = Vec::with_capacity(records.len() + 1);
    for record in records {
        xs.push(json!(scalar_x(record)));
        ys.push(json!(record.y));
    }
    if let Some(last) = records.last() {
        xs.push(json!(last.x_next));
        ys.push(json!(last.y_next));
    }
    figure(
        &format!("{} solution", method),
        "x",
        "y",
        vec![json!({ "name": "y(x)", "x": xs, "y": ys, "mode": "lines+markers" })],
    )
}
