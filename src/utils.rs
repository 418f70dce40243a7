use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Initializes a terminal logger for hosts that want the per-iteration log
/// lines the solvers emit. Levels: "debug", "info", "warn", "error", "off".
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: &str) {
    let filter = match level {
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Off,
    };
    let _ = CombinedLogger::init(vec![TermLogger::new(
        filter,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::linspace;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_includes_both_endpoints() {
        let pts = linspace(0.0, 2.0, 5);
        assert_eq!(pts.len(), 5);
        assert_relative_eq!(pts[0], 0.0);
        assert_relative_eq!(pts[2], 1.0);
        assert_relative_eq!(pts[4], 2.0);
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 1.0, 1), vec![3.0]);
    }
}
