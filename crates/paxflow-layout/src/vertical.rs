//! Vertical peak-spotting chart: one bar per section, stacked top to bottom, height by travel
//! time and width by passengers.

use crate::error::{Error, Result};
use crate::model::EntityId;
use crate::scale::load_ratio;
use crate::timeline::SectionSpec;
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerticalConfig {
    pub top_offset: f64,
    pub min_height: f64,
    pub min_width: f64,
    /// Space above every bar, leaving room for the stop marker.
    pub gap: f64,
    pub height_per_minute: f64,
    pub width_per_passenger: f64,
}

impl Default for VerticalConfig {
    fn default() -> Self {
        Self {
            top_offset: 20.0,
            min_height: 30.0,
            min_width: 5.0,
            gap: 4.0,
            height_per_minute: 3.0,
            width_per_passenger: 0.15,
        }
    }
}

impl VerticalConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("topOffset", self.top_offset),
            ("minHeight", self.min_height),
            ("minWidth", self.min_width),
            ("gap", self.gap),
            ("heightPerMinute", self.height_per_minute),
            ("widthPerPassenger", self.width_per_passenger),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a non-negative number, got {v}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalBar {
    pub section_id: EntityId,
    pub y: f64,
    pub height: f64,
    pub travelled_minutes: u32,
    pub capacity_width: f64,
    pub load_width: f64,
    pub occupancy: f64,
    pub capacity: f64,
    pub load_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalLayout {
    pub bars: Vec<VerticalBar>,
    pub total_height: f64,
}

/// Minutes from departure to arrival, adding a day when the section crosses midnight.
pub fn travelled_minutes(section: &SectionSpec) -> u32 {
    let departure = section.departure.minutes();
    let arrival = section.arrival.minutes();
    if arrival < departure {
        arrival + MINUTES_PER_DAY - departure
    } else {
        arrival - departure
    }
}

pub fn layout_vertical(
    sections: &[SectionSpec],
    config: &VerticalConfig,
) -> Result<VerticalLayout> {
    config.validate()?;

    let mut offset = config.top_offset;
    let mut bars = Vec::with_capacity(sections.len());
    for section in sections {
        section.validate()?;
        let minutes = travelled_minutes(section);
        let height = (f64::from(minutes) * config.height_per_minute).max(config.min_height);
        bars.push(VerticalBar {
            section_id: section.id.clone(),
            y: offset + config.gap,
            height,
            travelled_minutes: minutes,
            capacity_width: (section.capacity * config.width_per_passenger).max(config.min_width),
            load_width: section.occupancy * config.width_per_passenger,
            occupancy: section.occupancy,
            capacity: section.capacity,
            load_ratio: load_ratio(section.occupancy, section.capacity),
        });
        offset += height + config.gap;
    }

    tracing::debug!(sections = sections.len(), total_height = offset, "laid out vertical chart");
    Ok(VerticalLayout {
        bars,
        total_height: offset,
    })
}
