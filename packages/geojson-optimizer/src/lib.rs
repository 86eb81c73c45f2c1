//! Coordinate precision optimizer for the GeoJSON layers served to the land
//! suitability dashboard (barangay boundaries, SAFDZ zones, hazard overlays).
//!
//! The library rounds every position of a FeatureCollection to a fixed number
//! of decimals, drops elevation values, optionally simplifies polygon rings,
//! and reports what it did. The `optimize-geojson` binary wraps it for batch
//! use; the `wasm` feature exposes it to the browser.

// Logging shared by the CLI and the browser build
pub mod console;
pub mod error;
pub mod config;
// Geometry tree decoding and rounding
pub mod coordinates;
// Douglas-Peucker ring simplification
pub mod simplify;
// FeatureCollection validation and traversal
pub mod collection;
// File to file runs with size reporting
pub mod job;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use collection::{optimize_collection, validate_collection, CollectionOutcome};
pub use config::{parse_precision_arg, OptimizeOptions, DEFAULT_PRECISION};
pub use coordinates::{reduce_coordinates, round_coordinate, CoordinateTree, GeometryKind};
pub use error::{OptimizeError, Result};
pub use job::{run_job, JobReport};

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console::log(&format!($($t)*)))
}
