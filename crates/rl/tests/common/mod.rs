#![allow(dead_code)]

use features::{FeatureStore, LoopFeature};
use std::time::Duration;

pub fn feature(loop_id: &str, num_blocks: u32) -> LoopFeature {
    LoopFeature {
        loop_id: loop_id.to_string(),
        num_blocks,
        num_loads: 2,
        num_stores: 1,
        num_arith: 5,
        num_calls: 0,
        trip_count_est: -1,
        function: None,
        header: None,
    }
}

pub fn store(ids: &[&str]) -> FeatureStore {
    let loops = ids
        .iter()
        .zip(1..)
        .map(|(id, blocks)| feature(id, blocks))
        .collect();
    FeatureStore::from_loops(loops).unwrap()
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
