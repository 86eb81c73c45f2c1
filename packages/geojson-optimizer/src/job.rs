use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::collection::optimize_collection;
use crate::config::OptimizeOptions;
use crate::console_log;
use crate::error::{OptimizeError, Result};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Summary of one optimization run, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub precision: u32,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub features_processed: usize,
    pub geometries_touched: usize,
    pub positions_written: usize,
    pub elapsed: Duration,
}

impl JobReport {
    /// Size saved relative to the input, in percent. Negative when the output grew.
    pub fn reduction_percent(&self) -> f64 {
        size_reduction_percent(self.input_bytes, self.output_bytes)
    }
}

pub fn size_reduction_percent(input_bytes: u64, output_bytes: u64) -> f64 {
    if input_bytes == 0 {
        return 0.0;
    }
    (1.0 - output_bytes as f64 / input_bytes as f64) * 100.0
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization complete!")?;
        writeln!(f, "Input file:          {}", self.input_path.display())?;
        writeln!(f, "Output file:         {}", self.output_path.display())?;
        writeln!(f, "Precision:           {} decimal places", self.precision)?;
        writeln!(f, "Input size:          {:.2} MB", self.input_bytes as f64 / BYTES_PER_MB)?;
        writeln!(f, "Output size:         {:.2} MB", self.output_bytes as f64 / BYTES_PER_MB)?;
        writeln!(f, "Size reduction:      {:.1}%", self.reduction_percent())?;
        writeln!(f, "Features processed:  {}", self.features_processed)?;
        writeln!(f, "Geometries optimized: {}", self.geometries_touched)?;
        writeln!(f, "Positions written:   {}", self.positions_written)?;
        write!(f, "Time taken:          {:.2}s", self.elapsed.as_secs_f64())
    }
}

/// Optimize the FeatureCollection at `input` and write it minified to `output`.
///
/// Nothing is written unless every step before persisting succeeded, and the
/// output is replaced atomically.
pub fn run_job(input: &Path, output: &Path, options: &OptimizeOptions) -> Result<JobReport> {
    options.validate()?;
    let start = Instant::now();

    if !input.exists() {
        return Err(OptimizeError::NotFound(input.to_path_buf()));
    }

    console_log!("Optimizing GeoJSON file: {}", input.display());
    console_log!("Coordinate precision: {} decimal places", options.precision);
    if let Some(tolerance) = options.simplify_tolerance {
        console_log!("Simplify tolerance: {}", tolerance);
    }

    let raw = fs::read(input).map_err(|source| OptimizeError::ReadError {
        path: input.to_path_buf(),
        source,
    })?;
    let input_bytes = raw.len() as u64;

    let collection: Value = serde_json::from_slice(&raw)?;
    drop(raw);

    let outcome = optimize_collection(collection, options)?;

    let encoded = serde_json::to_vec(&outcome.collection).map_err(|e| OptimizeError::WriteError {
        path: output.to_path_buf(),
        source: io::Error::from(e),
    })?;
    write_atomically(output, &encoded).map_err(|source| OptimizeError::WriteError {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(JobReport {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        precision: options.precision,
        input_bytes,
        output_bytes: encoded.len() as u64,
        features_processed: outcome.features_processed,
        geometries_touched: outcome.geometries_touched,
        positions_written: outcome.positions_written,
        elapsed: start.elapsed(),
    })
}

// Stage the bytes next to the destination so the final rename stays on one
// filesystem. The temp file is removed on any error.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
