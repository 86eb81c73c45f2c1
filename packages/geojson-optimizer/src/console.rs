// Log sink shared by the CLI and the browser build.
//
// Natively everything goes through the `log` facade (configured by
// env_logger in the binary). Under the `wasm` feature messages are forwarded
// to `console.log` as well, since there is no logger installed in the page.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
#[wasm_bindgen]
extern "C" {
    // Use `js_namespace` to bind `console.log(..)` instead of just `log(..)`
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

#[cfg(not(feature = "wasm"))]
pub fn log(s: &str) {
    log::info!(target: "geojson_optimizer", "{}", s);
}
