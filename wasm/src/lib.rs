//! WebAssembly module for the Block Inventory Platform
//!
//! Provides client-side computation for:
//! - Block volume
//! - Storage volume over the last seven days
//! - Block dimension validation before submitting a batch

use chrono::{DateTime, TimeZone, Utc};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::aggregation::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Cubic millimetres in one cubic metre
const MM3_PER_M3: f64 = 1_000_000_000.0;

#[cfg(target_arch = "wasm32")]
fn now() -> DateTime<Utc> {
    from_millis(js_sys::Date::now()).unwrap_or_else(|_| Utc.timestamp_nanos(0))
}

#[cfg(not(target_arch = "wasm32"))]
fn now() -> DateTime<Utc> {
    Utc::now()
}

fn from_millis(millis: f64) -> Result<DateTime<Utc>, JsValue> {
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .ok_or_else(|| JsValue::from_str(&format!("Invalid timestamp: {}", millis)))
}

fn parse_blocks(blocks_json: &str) -> Result<Vec<Block>, JsValue> {
    serde_json::from_str::<Vec<Block>>(blocks_json).map_err(|e| {
        let message = format!("Invalid blocks JSON: {}", e);
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&JsValue::from_str(&message));
        JsValue::from_str(&message)
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Calculate block volume in cubic millimetres
#[wasm_bindgen]
pub fn calculate_block_volume(height: f64, width: f64, length: f64) -> f64 {
    block_volume(height, width, length)
}

/// Convert cubic millimetres to cubic metres
#[wasm_bindgen]
pub fn mm3_to_m3(volume_mm3: f64) -> f64 {
    volume_mm3 / MM3_PER_M3
}

/// Validate block dimensions (all must be greater than 0)
#[wasm_bindgen]
pub fn validate_block_dimensions(height: f64, width: f64, length: f64) -> bool {
    validate_dimensions(height, width, length).is_ok()
}

/// Storage volume per day for the last seven days, as a JSON array
/// `[{ date, volume }]`, today first.
///
/// `blocks_json` is the `blocksAddedEver` list from the dashboard response.
#[wasm_bindgen]
pub fn calculate_storage_volume_by_day(blocks_json: &str, now_millis: f64) -> Result<String, JsValue> {
    let blocks = parse_blocks(blocks_json)?;
    to_json(&storage_volume_by_day(&blocks, from_millis(now_millis)?))
}

/// Storage card numbers (`totalVolume`, `volumeByDay`, `changePercentage`)
/// as JSON, evaluated at the current time
#[wasm_bindgen]
pub fn calculate_storage_overview(blocks_json: &str) -> Result<String, JsValue> {
    let blocks = parse_blocks(blocks_json)?;
    to_json(&storage_overview(&blocks, now()))
}
