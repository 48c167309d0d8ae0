use crate::error::{Error, Result};
use crate::timeline::DEFAULT_FRAME_HOURS;
use serde::{Deserialize, Serialize};

/// Cosmetic seam between a capacity bar and its overflow bar.
pub const DEFAULT_OVERFLOW_GAP: f64 = 1.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideAlignment {
    /// Source and target nodes with the same id share a row and are centered on each other.
    #[default]
    Paired,
    /// Each side is stacked on its own.
    Independent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Rank,
    /// Real nodes additionally get a horizontal offset derived from their display time.
    Time(TimeAxis),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAxis {
    pub width: f64,
    #[serde(default = "default_frame_hours")]
    pub frame_hours: f64,
    /// Offset applied to display times before reading the wall clock.
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

impl TimeAxis {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            frame_hours: DEFAULT_FRAME_HOURS,
            utc_offset_seconds: 0,
        }
    }
}

fn default_frame_hours() -> f64 {
    DEFAULT_FRAME_HOURS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Passengers per pixel.
    pub scale_factor: f64,
    pub min_node_extent: f64,
    pub min_link_extent: f64,
    /// Gap between consecutive rows; also the trailing margin of `total_extent`.
    pub padding: f64,
    pub overflow_gap: f64,
    pub alignment: SideAlignment,
    pub axis: Axis,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::station()
    }
}

impl LayoutConfig {
    /// Interchanges at one station: arriving trips left, departing trips right.
    pub fn station() -> Self {
        Self {
            scale_factor: 4.0,
            min_node_extent: 2.0,
            min_link_extent: 2.0,
            padding: 20.0,
            overflow_gap: DEFAULT_OVERFLOW_GAP,
            alignment: SideAlignment::Paired,
            axis: Axis::Rank,
        }
    }

    /// Boarding and alighting along the stops of a single trip.
    pub fn trip() -> Self {
        Self {
            scale_factor: 5.0,
            min_node_extent: 4.0,
            min_link_extent: 4.0,
            ..Self::station()
        }
    }

    /// Transfers between two independent trip lists.
    pub fn interchange() -> Self {
        Self {
            alignment: SideAlignment::Independent,
            ..Self::station()
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(invalid(format!(
                "scaleFactor must be positive, got {}",
                self.scale_factor
            )));
        }
        for (name, v) in [
            ("minNodeExtent", self.min_node_extent),
            ("minLinkExtent", self.min_link_extent),
            ("padding", self.padding),
            ("overflowGap", self.overflow_gap),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(invalid(format!("{name} must be a non-negative number, got {v}")));
            }
        }
        // A node carrying one link must not be held taller than that link.
        if self.min_node_extent > self.min_link_extent {
            return Err(invalid(format!(
                "minNodeExtent ({}) must not exceed minLinkExtent ({})",
                self.min_node_extent, self.min_link_extent
            )));
        }
        if let Axis::Time(axis) = self.axis {
            if !(axis.width.is_finite() && axis.width > 0.0) {
                return Err(invalid(format!("axis width must be positive, got {}", axis.width)));
            }
            if !(axis.frame_hours.is_finite() && axis.frame_hours > 0.0) {
                return Err(invalid(format!(
                    "frameHours must be positive, got {}",
                    axis.frame_hours
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig { message }
}
