//! Capacity and overflow bars.
//!
//! Bars grow from a baseline towards smaller coordinates (up on screen). The within-capacity
//! part sits on the baseline; the overflow part sits on top of it, separated by a small seam.
//! The seam only shrinks the rendered overflow: every segment keeps its true passenger value.

use crate::model::LayoutNode;
use crate::scale::scale_raw;
use serde::{Deserialize, Serialize};

/// A span along one axis and the passenger count it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub value: f64,
}

impl Segment {
    pub fn extent(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowGeometry {
    /// The load up to capacity (the whole load when not overflowing).
    pub within: Segment,
    /// Present when occupancy exceeds capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<Segment>,
    /// Overflow extent before the seam is taken off.
    pub overflow_extent: f64,
}

impl OverflowGeometry {
    pub fn is_overflowing(&self) -> bool {
        self.overflow.is_some()
    }
}

/// Splits a load of `occupancy` passengers against `capacity`, scaled by `factor` passengers
/// per pixel, on a bar whose baseline is `baseline`.
pub fn split(
    baseline: f64,
    occupancy: f64,
    capacity: f64,
    factor: f64,
    gap: f64,
) -> OverflowGeometry {
    split_extents(
        baseline,
        (occupancy, scale_raw(occupancy, factor)),
        (capacity, scale_raw(capacity, factor)),
        gap,
    )
}

/// Overflow geometry of a stacked node: the backdrop is the within part, the part of the body
/// reaching above the backdrop is the overflow. `None` unless the node is overflowing.
pub fn node_overflow(node: &LayoutNode, gap: f64) -> Option<OverflowGeometry> {
    if !node.overflowing {
        return None;
    }
    let geometry = split_extents(
        node.backdrop_end,
        (node.occupancy, node.body_extent),
        (node.capacity, node.backdrop_extent),
        gap,
    );
    geometry.is_overflowing().then_some(geometry)
}

/// `load` and `capacity` are (passengers, extent) pairs.
fn split_extents(
    baseline: f64,
    load: (f64, f64),
    capacity: (f64, f64),
    gap: f64,
) -> OverflowGeometry {
    let (occupancy, load_extent) = load;
    let (capacity, capacity_extent) = capacity;

    if occupancy <= capacity {
        return OverflowGeometry {
            within: Segment {
                start: baseline - load_extent,
                end: baseline,
                value: occupancy,
            },
            overflow: None,
            overflow_extent: 0.0,
        };
    }

    let within = Segment {
        start: baseline - capacity_extent,
        end: baseline,
        value: capacity,
    };
    let overflow_extent = (load_extent - capacity_extent).max(0.0);
    let rendered = (overflow_extent - gap).max(0.0);
    let end = (within.start - gap).max(0.0);
    let overflow = Segment {
        start: (end - rendered).max(0.0),
        end,
        value: occupancy - capacity,
    };

    OverflowGeometry {
        within,
        overflow: Some(overflow),
        overflow_extent,
    }
}
