//! Passenger counts to pixel extents.

/// Scales `value` by `factor`, never returning less than `min_extent` for a positive value.
/// Zero and negative values yield zero.
pub fn scale(value: f64, factor: f64, min_extent: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    scale_raw(value, factor).max(min_extent)
}

/// Unclamped extent, used to measure how much a clamp added.
pub fn scale_raw(value: f64, factor: f64) -> f64 {
    value / factor
}

/// Extra extent introduced by clamping `value` up to `min_extent`.
pub fn clamp_excess(value: f64, factor: f64, min_extent: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    (scale(value, factor, min_extent) - scale_raw(value, factor)).max(0.0)
}

/// Occupancy relative to capacity, clamped to `[0, 1]`.
pub fn load_ratio(occupancy: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        return if occupancy > 0.0 { 1.0 } else { 0.0 };
    }
    (occupancy / capacity).clamp(0.0, 1.0)
}
