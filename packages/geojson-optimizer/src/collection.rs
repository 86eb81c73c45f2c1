use std::ops::Add;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde_json::Value;

use crate::config::OptimizeOptions;
use crate::console_log;
use crate::coordinates::{CoordinateTree, GeometryKind};
use crate::error::{OptimizeError, Result};
use crate::simplify::simplify_rings;

const PROGRESS_INTERVAL: usize = 1000;

/// Result of optimizing one FeatureCollection.
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    pub collection: Value,
    pub features_processed: usize,
    /// Features whose geometry carried coordinates.
    pub geometries_touched: usize,
    pub positions_written: usize,
    pub elapsed: Duration,
}

/// Counters for one feature, or summed over many.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Totals {
    geometries: usize,
    positions: usize,
}

impl Add for Totals {
    type Output = Totals;

    fn add(self, other: Totals) -> Totals {
        Totals {
            geometries: self.geometries + other.geometries,
            positions: self.positions + other.positions,
        }
    }
}

/// Check that `collection` is a FeatureCollection with a `features` array.
pub fn validate_collection(collection: &Value) -> Result<()> {
    match collection.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(OptimizeError::InvalidFormat(format!(
                "expected a FeatureCollection, found {}",
                other
            )))
        }
        None => {
            return Err(OptimizeError::InvalidFormat(
                "missing top-level \"type\": \"FeatureCollection\"".to_string(),
            ))
        }
    }

    if !collection.get("features").is_some_and(Value::is_array) {
        return Err(OptimizeError::InvalidFormat(
            "\"features\" is not an array".to_string(),
        ));
    }

    Ok(())
}

/// Round the coordinates of every feature in `collection`.
///
/// Feature order, `properties`, ids and every member other than
/// `geometry.coordinates` are left as they were. Features without geometry
/// pass through and are not counted as touched.
pub fn optimize_collection(mut collection: Value, options: &OptimizeOptions) -> Result<CollectionOutcome> {
    options.validate()?;
    validate_collection(&collection)?;

    let start = Instant::now();
    let features = collection
        .get_mut("features")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| OptimizeError::InvalidFormat("\"features\" is not an array".to_string()))?;
    let feature_count = features.len();

    let totals = if options.parallel && feature_count >= options.parallel_threshold.max(1) {
        log::debug!(
            "Processing {} features on {} threads",
            feature_count,
            options.effective_threads()
        );
        process_parallel(features, options)?
    } else {
        process_sequential(features, options)
    };

    console_log!(
        "Optimized {} geometries across {} features",
        totals.geometries,
        feature_count
    );

    Ok(CollectionOutcome {
        collection,
        features_processed: feature_count,
        geometries_touched: totals.geometries,
        positions_written: totals.positions,
        elapsed: start.elapsed(),
    })
}

fn process_sequential(features: &mut [Value], options: &OptimizeOptions) -> Totals {
    let total = features.len();
    let mut totals = Totals::default();

    for (index, feature) in features.iter_mut().enumerate() {
        totals = totals + optimize_feature(feature, options);

        if (index + 1) % PROGRESS_INTERVAL == 0 {
            log::debug!("Processed {}/{} features...", index + 1, total);
        }
    }

    totals
}

fn process_parallel(features: &mut [Value], options: &OptimizeOptions) -> Result<Totals> {
    let run = |features: &mut [Value]| {
        features
            .par_iter_mut()
            .map(|feature| optimize_feature(feature, options))
            .reduce(Totals::default, |a, b| a + b)
    };

    match options.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| OptimizeError::InvalidOption(format!("Failed to start worker pool: {}", e)))?;
            Ok(pool.install(|| run(features)))
        }
        None => Ok(run(features)),
    }
}

fn optimize_feature(feature: &mut Value, options: &OptimizeOptions) -> Totals {
    match feature.get_mut("geometry") {
        Some(geometry) => optimize_geometry(geometry, options),
        None => Totals::default(),
    }
}

fn optimize_geometry(geometry: &mut Value, options: &OptimizeOptions) -> Totals {
    let kind = GeometryKind::of_geometry(geometry);
    let Some(object) = geometry.as_object_mut() else {
        // null geometry
        return Totals::default();
    };

    if kind == GeometryKind::GeometryCollection {
        return match object.get_mut("geometries") {
            Some(Value::Array(members)) => {
                let sum = members
                    .iter_mut()
                    .map(|member| optimize_geometry(member, options))
                    .fold(Totals::default(), |acc, stats| acc + stats);
                // the whole collection is one feature geometry
                Totals {
                    geometries: sum.geometries.min(1),
                    positions: sum.positions,
                }
            }
            _ => Totals::default(),
        };
    }

    let coordinates = match object.get_mut("coordinates") {
        Some(coordinates) if !coordinates.is_null() => coordinates,
        _ => return Totals::default(),
    };

    let mut tree = CoordinateTree::from_value(coordinates, kind).reduce(options.precision);
    if let Some(tolerance) = options.simplify_tolerance {
        tree = simplify_rings(tree, kind, tolerance);
    }

    let positions = tree.position_count();
    *coordinates = tree.into_value();

    Totals {
        geometries: 1,
        positions,
    }
}
