//! Derived views over block lists
//!
//! Everything here is pure: callers fetch typed rows from the store and hand
//! them in. The same functions back the server-side dashboard and the
//! browser (through the WASM crate), so both render identical numbers.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use indexmap::IndexMap;

use crate::models::{
    Block, BlockDetails, BlockType, BlockTypeSummary, DailyVolume, StorageOverview, Supplier,
    SupplierSummary,
};

/// Number of calendar days covered by the storage volume series
pub const STORAGE_WINDOW_DAYS: i64 = 7;

/// Count items per key, keeping keys in the order they are first seen
pub fn count_by<'a, T, K, F>(items: impl IntoIterator<Item = &'a T>, mut key: F) -> IndexMap<K, i64>
where
    T: 'a,
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let mut counts = IndexMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

fn group_by_id<F>(blocks: &[BlockDetails], id: F) -> HashMap<i32, Vec<&BlockDetails>>
where
    F: Fn(&BlockDetails) -> i32,
{
    let mut groups: HashMap<i32, Vec<&BlockDetails>> = HashMap::new();
    for block in blocks {
        groups.entry(id(block)).or_default().push(block);
    }
    groups
}

/// Summarize each block type against the given blocks.
///
/// `totalBlocks` and the per-supplier counts only include blocks still in
/// storage; `canDelete` considers every block, processed or not.
pub fn summarize_block_types(
    block_types: Vec<BlockType>,
    blocks: &[BlockDetails],
) -> Vec<BlockTypeSummary> {
    let groups = group_by_id(blocks, |b| b.block.block_type_id);

    block_types
        .into_iter()
        .map(|block_type| {
            let related = groups
                .get(&block_type.block_type_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let in_storage: Vec<&BlockDetails> =
                related.iter().copied().filter(|b| !b.block.processed).collect();
            let blocks_by_supplier =
                count_by(in_storage.iter().copied(), |b| b.supplier.supplier_name.clone());

            BlockTypeSummary {
                block_type_id: block_type.block_type_id,
                block_name: block_type.block_name,
                density: block_type.density,
                total_blocks: in_storage.len() as i64,
                blocks_by_supplier,
                can_delete: related.is_empty(),
            }
        })
        .collect()
}

/// Summarize each supplier against the given blocks, grouping by block type name
pub fn summarize_suppliers(
    suppliers: Vec<Supplier>,
    blocks: &[BlockDetails],
) -> Vec<SupplierSummary> {
    let groups = group_by_id(blocks, |b| b.block.supplier_id);

    suppliers
        .into_iter()
        .map(|supplier| {
            let related = groups
                .get(&supplier.supplier_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let in_storage: Vec<&BlockDetails> =
                related.iter().copied().filter(|b| !b.block.processed).collect();
            let blocks_by_block_type =
                count_by(in_storage.iter().copied(), |b| b.block_type.block_name.clone());

            SupplierSummary {
                supplier_id: supplier.supplier_id,
                supplier_name: supplier.supplier_name,
                total_blocks: in_storage.len() as i64,
                blocks_by_block_type,
                can_delete: related.is_empty(),
            }
        })
        .collect()
}

/// First and last instant (millisecond precision) of a UTC calendar day
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end))
}

/// Whether the block sat in storage at some point of `[start, end]`
pub fn is_in_storage(block: &Block, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    block.arrival_date <= end && block.removal_date.map_or(true, |removed| removed > start)
}

/// Volume in storage for each of the last seven days, today first.
///
/// Reconstructed from arrival and removal timestamps; a block that leaves
/// and comes back on the same day is not modelled.
pub fn storage_volume_by_day<B: AsRef<Block>>(blocks: &[B], now: DateTime<Utc>) -> Vec<DailyVolume> {
    let today = now.date_naive();

    (0..STORAGE_WINDOW_DAYS)
        .map(|offset| {
            let day = today - Duration::days(offset);
            let (start, end) = day_bounds(day);
            let volume = blocks
                .iter()
                .map(AsRef::<Block>::as_ref)
                .filter(|block| is_in_storage(block, start, end))
                .map(Block::volume)
                .sum();
            DailyVolume { date: day, volume }
        })
        .collect()
}

/// Volume of unprocessed blocks that arrived before the end of today
pub fn storage_volume_today<B: AsRef<Block>>(blocks: &[B], now: DateTime<Utc>) -> f64 {
    let (_, end_of_today) = day_bounds(now.date_naive());

    blocks
        .iter()
        .map(AsRef::<Block>::as_ref)
        .filter(|block| !block.processed && block.arrival_date < end_of_today)
        .map(Block::volume)
        .sum()
}

/// Percentage change of `current` against the oldest day of the series.
/// Zero when there is no baseline.
pub fn storage_change_percentage(current: f64, series: &[DailyVolume]) -> f64 {
    match series.last() {
        Some(oldest) if oldest.volume > 0.0 => (current - oldest.volume) / oldest.volume * 100.0,
        _ => 0.0,
    }
}

/// Storage card numbers computed in one pass over the blocks
pub fn storage_overview<B: AsRef<Block>>(blocks: &[B], now: DateTime<Utc>) -> StorageOverview {
    let volume_by_day = storage_volume_by_day(blocks, now);
    let total_volume = storage_volume_today(blocks, now);
    let change_percentage = storage_change_percentage(total_volume, &volume_by_day);

    StorageOverview {
        total_volume,
        volume_by_day,
        change_percentage,
    }
}
