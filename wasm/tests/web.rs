//! Checks for the exported bindings under a wasm32 runtime

#![cfg(target_arch = "wasm32")]

use block_inventory_wasm::{
    calculate_block_volume, calculate_storage_overview, calculate_storage_volume_by_day,
    mm3_to_m3, validate_block_dimensions, DailyVolume, StorageOverview,
};
use chrono::{TimeZone, Utc};
use wasm_bindgen_test::*;

const BLOCKS: &str = r#"[
    {
        "blockId": "7", "blockTypeId": 1, "supplierId": 2,
        "height": 1000, "width": 1000, "length": 2000,
        "arrivalDate": "2024-05-08T08:00:00Z", "removalDate": null, "processed": false,
        "blockType": { "blockTypeId": 1, "blockName": "Granite", "density": 2700 }
    }
]"#;

#[wasm_bindgen_test]
fn block_volume_in_cubic_metres() {
    let volume = calculate_block_volume(1000.0, 1000.0, 2000.0);
    assert_eq!(volume, 2_000_000_000.0);
    assert_eq!(mm3_to_m3(volume), 2.0);
}

#[wasm_bindgen_test]
fn rejects_non_positive_dimensions() {
    assert!(validate_block_dimensions(1600.0, 1200.0, 2000.0));
    assert!(!validate_block_dimensions(-1.0, 1200.0, 2000.0));
}

#[wasm_bindgen_test]
fn volume_by_day_starts_on_arrival() {
    let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
    let json = calculate_storage_volume_by_day(BLOCKS, now.timestamp_millis() as f64).unwrap();
    let series: Vec<DailyVolume> = serde_json::from_str(&json).unwrap();

    assert_eq!(series.len(), 7);
    // Today first; the block arrived two days ago
    assert_eq!(series[0].volume, 2_000_000_000.0);
    assert_eq!(series[2].volume, 2_000_000_000.0);
    assert_eq!(series[3].volume, 0.0);
}

#[wasm_bindgen_test]
fn overview_uses_current_clock() {
    let json = calculate_storage_overview(BLOCKS).unwrap();
    let overview: StorageOverview = serde_json::from_str(&json).unwrap();
    assert_eq!(overview.total_volume, 2_000_000_000.0);
    assert_eq!(overview.volume_by_day.len(), 7);
}

#[wasm_bindgen_test]
fn malformed_json_is_an_error() {
    assert!(calculate_storage_overview("{not json").is_err());
    assert!(calculate_storage_volume_by_day("[{}]", 0.0).is_err());
}
