//! Time-of-day axis and the horizontal peak-spotting chart.
//!
//! The axis spans `frame_hours` hours; the default of 25 leaves an empty hour after midnight so
//! sections ending at `24:00` do not touch sections starting at `00:00`.

use crate::error::{Error, Result, check_quantity};
use crate::model::EntityId;
use crate::overflow::{Segment, split};
use crate::scale::{load_ratio, scale_raw};
use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FRAME_HOURS: f64 = 25.0;
/// Passengers per pixel of bar height.
pub const DEFAULT_CAPACITY_SCALE: f64 = 13.0;

/// Wall-clock time of day. `24:00` is allowed as the end of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime { hour: 0, minute: 0 };
    pub const END_OF_DAY: ClockTime = ClockTime {
        hour: 24,
        minute: 0,
    };

    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        let t = Self { hour, minute };
        t.validate()?;
        Ok(t)
    }

    /// Local wall-clock time of a unix timestamp.
    pub fn from_timestamp(seconds: i64, utc_offset_seconds: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(utc_offset_seconds)?;
        let local = DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset);
        Some(Self {
            hour: local.hour(),
            minute: local.minute(),
        })
    }

    pub fn validate(self) -> Result<()> {
        let valid = (self.hour < 24 && self.minute < 60) || self == Self::END_OF_DAY;
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidClockTime {
                hour: self.hour,
                minute: self.minute,
            })
        }
    }

    pub fn minutes(self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Horizontal position of `hour:minute` on an axis `width` wide covering `frame_hours` hours.
pub fn time_to_x(width: f64, hour: u32, minute: u32, frame_hours: f64) -> f64 {
    width * (f64::from(hour) / frame_hours + f64::from(minute) / (60.0 * frame_hours))
}

pub fn segment_width(
    width: f64,
    departure_hour: u32,
    departure_minute: u32,
    arrival_hour: u32,
    arrival_minute: u32,
    frame_hours: f64,
) -> f64 {
    time_to_x(width, arrival_hour, arrival_minute, frame_hours)
        - time_to_x(width, departure_hour, departure_minute, frame_hours)
}

/// Splits `departure..arrival` at midnight when it wraps. The flag marks the synthetic half
/// starting at `00:00`. A departure at `24:00` counts as `00:00` of the next day and an arrival
/// at `00:00` as `24:00` of the departure day, so no half is ever empty.
pub fn day_spans(
    departure: ClockTime,
    arrival: ClockTime,
) -> Vec<(ClockTime, ClockTime, bool)> {
    let departure = if departure == ClockTime::END_OF_DAY {
        ClockTime::MIDNIGHT
    } else {
        departure
    };
    let arrival = if arrival == ClockTime::MIDNIGHT && departure > arrival {
        ClockTime::END_OF_DAY
    } else {
        arrival
    };
    if departure > arrival {
        vec![
            (departure, ClockTime::END_OF_DAY, false),
            (ClockTime::MIDNIGHT, arrival, true),
        ]
    } else {
        vec![(departure, arrival, false)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    pub width: f64,
    /// Chart height; bars grow up from here.
    pub height: f64,
    pub frame_hours: f64,
    pub capacity_scale: f64,
    pub overflow_gap: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 200.0,
            frame_hours: DEFAULT_FRAME_HOURS,
            capacity_scale: DEFAULT_CAPACITY_SCALE,
            overflow_gap: crate::config::DEFAULT_OVERFLOW_GAP,
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("width", self.width),
            ("height", self.height),
            ("frameHours", self.frame_hours),
            ("capacityScale", self.capacity_scale),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be positive, got {v}"),
                });
            }
        }
        if !(self.overflow_gap.is_finite() && self.overflow_gap >= 0.0) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "overflowGap must be a non-negative number, got {}",
                    self.overflow_gap
                ),
            });
        }
        Ok(())
    }
}

/// One leg of a trip between two consecutive stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSpec {
    pub id: EntityId,
    pub departure: ClockTime,
    pub arrival: ClockTime,
    pub occupancy: f64,
    pub capacity: f64,
    /// A second load figure drawn behind the main one, e.g. a lower-bound forecast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_occupancy: Option<f64>,
}

impl SectionSpec {
    pub fn new(
        id: impl Into<EntityId>,
        departure: ClockTime,
        arrival: ClockTime,
        occupancy: f64,
        capacity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            departure,
            arrival,
            occupancy,
            capacity,
            reference_occupancy: None,
        }
    }

    /// Builds a section from unix departure/arrival times read on a fixed-offset wall clock.
    pub fn from_timestamps(
        id: impl Into<EntityId>,
        departure: i64,
        arrival: i64,
        utc_offset_seconds: i32,
        occupancy: f64,
        capacity: f64,
    ) -> Result<Self> {
        let id = id.into();
        let clock = |field: &str, seconds: i64| {
            ClockTime::from_timestamp(seconds, utc_offset_seconds).ok_or_else(|| {
                Error::InvalidTimestamp {
                    owner: format!("{field} of section {id}"),
                    seconds,
                }
            })
        };
        let departure = clock("departure", departure)?;
        let arrival = clock("arrival", arrival)?;
        Ok(Self::new(id, departure, arrival, occupancy, capacity))
    }

    pub fn with_reference(mut self, occupancy: f64) -> Self {
        self.reference_occupancy = Some(occupancy);
        self
    }

    pub fn wraps_midnight(&self) -> bool {
        day_spans(self.departure, self.arrival).len() > 1
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.departure.validate()?;
        self.arrival.validate()?;
        let owner = || format!("section {}", self.id);
        check_quantity("occupancy", owner, self.occupancy)?;
        check_quantity("capacity", owner, self.capacity)?;
        if let Some(reference) = self.reference_occupancy {
            check_quantity("referenceOccupancy", owner, reference)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Load,
    Overflow,
    Reference,
}

/// One rectangle of the chart. `value` is the true passenger count behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSegment {
    pub section_id: EntityId,
    pub kind: SegmentKind,
    pub departure: ClockTime,
    pub arrival: ClockTime,
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
    pub value: f64,
    pub capacity: f64,
    pub load_ratio: f64,
    /// The half of a midnight-crossing section that restarts at `00:00`.
    pub wrapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayout {
    pub width: f64,
    pub height: f64,
    pub segments: Vec<TimelineSegment>,
    /// Any section over capacity, so the caller can show a legend entry.
    pub any_overflow: bool,
}

/// Lays out trip sections as bars on a time-of-day axis.
///
/// Segments are emitted per section in input order; a midnight-crossing section yields its
/// departure half first. Within a half the order is load, overflow, reference.
pub fn layout_sections(
    sections: &[SectionSpec],
    config: &TimelineConfig,
) -> Result<TimelineLayout> {
    config.validate()?;

    let mut segments = Vec::with_capacity(sections.len() * 2);
    let mut any_overflow = false;
    for section in sections {
        section.validate()?;

        let geometry = split(
            config.height,
            section.occupancy,
            section.capacity,
            config.capacity_scale,
            config.overflow_gap,
        );
        any_overflow |= geometry.is_overflowing();

        let mut bars = vec![(SegmentKind::Load, geometry.within)];
        if let Some(overflow) = geometry.overflow {
            bars.push((SegmentKind::Overflow, overflow));
        }
        if let Some(reference) = section.reference_occupancy {
            let extent = scale_raw(reference, config.capacity_scale);
            bars.push((
                SegmentKind::Reference,
                Segment {
                    start: config.height - extent,
                    end: config.height,
                    value: reference,
                },
            ));
        }

        let ratio = load_ratio(section.occupancy, section.capacity);
        for (from, to, wrapped) in day_spans(section.departure, section.arrival) {
            let x = time_to_x(config.width, from.hour, from.minute, config.frame_hours);
            let width = segment_width(
                config.width,
                from.hour,
                from.minute,
                to.hour,
                to.minute,
                config.frame_hours,
            );
            for &(kind, bar) in &bars {
                segments.push(TimelineSegment {
                    section_id: section.id.clone(),
                    kind,
                    departure: from,
                    arrival: to,
                    x,
                    width,
                    y: bar.start,
                    height: bar.extent(),
                    value: bar.value,
                    capacity: section.capacity,
                    load_ratio: ratio,
                    wrapped,
                });
            }
        }
    }

    tracing::debug!(
        sections = sections.len(),
        segments = segments.len(),
        any_overflow,
        "laid out timeline"
    );
    Ok(TimelineLayout {
        width: config.width,
        height: config.height,
        segments,
        any_overflow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_day_is_the_only_hour_24() {
        assert!(ClockTime::new(24, 0).is_ok());
        assert!(ClockTime::new(24, 1).is_err());
        assert!(ClockTime::new(23, 60).is_err());
    }

    #[test]
    fn timestamps_use_the_wall_clock_offset() {
        // 2024-01-01T23:30:00Z
        let t = 1_704_151_800;
        assert_eq!(
            ClockTime::from_timestamp(t, 0),
            Some(ClockTime { hour: 23, minute: 30 })
        );
        assert_eq!(
            ClockTime::from_timestamp(t, 3600),
            Some(ClockTime { hour: 0, minute: 30 })
        );
        assert_eq!(ClockTime::from_timestamp(t, 100_000), None);
    }

    #[test]
    fn axis_is_linear_in_minutes() {
        assert_eq!(time_to_x(2500.0, 10, 0, 25.0), 1000.0);
        assert_eq!(time_to_x(2500.0, 0, 30, 25.0), 50.0);
        assert!((segment_width(2500.0, 10, 0, 11, 30, 25.0) - 150.0).abs() < 1e-9);
    }
}
