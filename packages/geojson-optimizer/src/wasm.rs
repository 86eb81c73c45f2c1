use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::collection::optimize_collection;
use crate::config::OptimizeOptions;
use crate::console_log;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptimizedGeoJson {
    geojson: String,
    features_processed: usize,
    geometries_touched: usize,
    positions_written: usize,
    input_bytes: usize,
    output_bytes: usize,
}

#[wasm_bindgen(start)]
pub fn start() {
    // Set the panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Round an uploaded FeatureCollection before it is handed to the map.
#[wasm_bindgen]
pub fn optimize_geojson(input_json: &str, precision: u32) -> Result<String, JsValue> {
    let optimized = optimize(input_json, precision, None)?;
    Ok(optimized.geojson)
}

/// Same as `optimize_geojson`, returning the statistics alongside the text.
#[wasm_bindgen]
pub fn optimize_geojson_with_stats(
    input_json: &str,
    precision: u32,
    simplify_tolerance: Option<f64>,
) -> Result<JsValue, JsValue> {
    let optimized = optimize(input_json, precision, simplify_tolerance)?;
    Ok(serde_wasm_bindgen::to_value(&optimized)?)
}

fn optimize(
    input_json: &str,
    precision: u32,
    simplify_tolerance: Option<f64>,
) -> Result<OptimizedGeoJson, JsValue> {
    // The browser thread cannot block on a rayon pool
    let options = OptimizeOptions::default()
        .with_precision(precision)
        .with_simplify_tolerance(simplify_tolerance)
        .with_parallel(false);

    let collection = serde_json::from_str(input_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse input: {}", e)))?;
    let outcome = optimize_collection(collection, &options)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let geojson = serde_json::to_string(&outcome.collection)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize output: {}", e)))?;

    console_log!(
        "Optimized {} features: {} -> {} bytes",
        outcome.features_processed,
        input_json.len(),
        geojson.len()
    );

    Ok(OptimizedGeoJson {
        features_processed: outcome.features_processed,
        geometries_touched: outcome.geometries_touched,
        positions_written: outcome.positions_written,
        input_bytes: input_json.len(),
        output_bytes: geojson.len(),
        geojson,
    })
}
