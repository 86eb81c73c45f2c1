use crate::error::{OptimizeError, Result};

/// Decimal places kept when no usable precision is given (~11 m at the equator).
pub const DEFAULT_PRECISION: u32 = 4;
/// Collections smaller than this are not worth spreading over threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOptions {
    /// Decimal places kept per coordinate. 0 rounds to whole degrees.
    pub precision: u32,
    /// Douglas-Peucker tolerance for polygon rings, in degrees. `None` keeps
    /// every vertex.
    pub simplify_tolerance: Option<f64>,
    pub parallel: bool,
    pub parallel_threshold: usize,
    /// Worker count for a dedicated pool; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            simplify_tolerance: None,
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            threads: None,
        }
    }
}

impl OptimizeOptions {
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_simplify_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.simplify_tolerance = tolerance;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(tolerance) = self.simplify_tolerance {
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(OptimizeError::InvalidOption(format!(
                    "simplify tolerance must be a positive number, got {}",
                    tolerance
                )));
            }
        }
        if self.threads == Some(0) {
            return Err(OptimizeError::InvalidOption(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of workers a parallel run would use.
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }
}

/// Interpret the optional precision argument. Missing or non-integer input
/// falls back to [`DEFAULT_PRECISION`]; an explicit `0` is honoured.
pub fn parse_precision_arg(arg: Option<&str>) -> u32 {
    let Some(raw) = arg else {
        return DEFAULT_PRECISION;
    };

    match raw.trim().parse::<i64>() {
        Ok(value) if value < 0 => {
            log::warn!(
                "Negative precision {} is not supported, using {}",
                value,
                DEFAULT_PRECISION
            );
            DEFAULT_PRECISION
        }
        Ok(value) => u32::try_from(value).unwrap_or(u32::MAX),
        Err(_) => {
            log::warn!(
                "Precision '{}' is not an integer, using {}",
                raw,
                DEFAULT_PRECISION
            );
            DEFAULT_PRECISION
        }
    }
}
