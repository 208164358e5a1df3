//! Display units. All stored distances are meters; conversion happens on read.

use serde::{Deserialize, Serialize};

const METERS_PER_MILE: f64 = 1_609.344;
const METERS_PER_KILOMETER: f64 = 1_000.0;
const METERS_PER_FOOT: f64 = 0.3048;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "miles" | "mile" | "mi" => Some(Self::Miles),
            "kilometers" | "kilometres" | "kilometer" | "km" => Some(Self::Kilometers),
            _ => None,
        }
    }

    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            Self::Miles => meters / METERS_PER_MILE,
            Self::Kilometers => meters / METERS_PER_KILOMETER,
        }
    }

    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            Self::Miles => value * METERS_PER_MILE,
            Self::Kilometers => value * METERS_PER_KILOMETER,
        }
    }

    /// Elevation is shown in feet alongside miles, meters alongside kilometers.
    pub fn elevation_from_meters(self, meters: f64) -> f64 {
        match self {
            Self::Miles => meters / METERS_PER_FOOT,
            Self::Kilometers => meters,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Miles => "mi",
            Self::Kilometers => "km",
        }
    }

    pub fn elevation_abbreviation(self) -> &'static str {
        match self {
            Self::Miles => "ft",
            Self::Kilometers => "m",
        }
    }

    pub fn format_distance(self, meters: f64) -> String {
        format!("{:.2} {}", self.from_meters(meters), self.abbreviation())
    }

    pub fn format_elevation(self, meters: f64) -> String {
        format!(
            "{:.2} {}",
            self.elevation_from_meters(meters),
            self.elevation_abbreviation()
        )
    }
}
