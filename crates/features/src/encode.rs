#![allow(clippy::cast_precision_loss)]

use crate::LoopFeature;

/// Number of values each loop contributes to an observation.
pub const OBS_WIDTH: usize = 6;

/// Encodes one loop as
/// `[num_blocks, num_loads, num_stores, num_arith, num_calls, trip_count_est]`.
///
/// The trip count sentinel `-1` is passed through as `-1.0`.
#[must_use]
pub fn encode(feature: &LoopFeature) -> [f32; OBS_WIDTH] {
    [
        feature.num_blocks as f32,
        feature.num_loads as f32,
        feature.num_stores as f32,
        feature.num_arith as f32,
        feature.num_calls as f32,
        feature.trip_count_est as f32,
    ]
}

/// Concatenates [`encode`] over `features`, keeping their order.
#[must_use]
pub fn encode_all(features: &[LoopFeature]) -> Vec<f32> {
    features.iter().flat_map(encode).collect()
}
