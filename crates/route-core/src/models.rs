//! Core data models for route editing.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees.
///
/// Serialized as a `[lon, lat]` pair, the same order map libraries use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        [coord.lon, coord.lat]
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(coord: Coordinate) -> Self {
        geo::Coord {
            x: coord.lon,
            y: coord.lat,
        }
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(coord: Coordinate) -> Self {
        geo::Point::new(coord.lon, coord.lat)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

/// One elevation sample along a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    /// Distance from the start of the owning segment (or route, once flattened)
    pub distance_m: f64,
    pub elevation_m: f64,
}

impl ElevationSample {
    pub const fn new(distance_m: f64, elevation_m: f64) -> Self {
        Self {
            distance_m,
            elevation_m,
        }
    }
}

/// Resolved path geometry between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Dense path; may differ from the straight line between the endpoints.
    pub coordinates: Vec<Coordinate>,
    pub length_m: f64,
    /// Samples aligned with `coordinates`, distances relative to segment start.
    pub elevation: Vec<ElevationSample>,
}

/// A user edit request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditIntent {
    Append { coord: Coordinate },
    DragStart { index: usize },
    DragMove { index: usize, coord: Coordinate },
    DragEnd { index: usize, coord: Coordinate },
    Reset,
}

impl EditIntent {
    /// Whether this intent mutates the committed route when accepted.
    pub fn is_commit(&self) -> bool {
        matches!(
            self,
            EditIntent::Append { .. } | EditIntent::DragEnd { .. } | EditIntent::Reset
        )
    }
}

/// Geographic bounding box of a route line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }
}

impl BoundingBox {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// Read-only view of a route handed to map and chart consumers after each commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub waypoints: Vec<Coordinate>,
    /// Segment geometry, one line per segment.
    pub lines: Vec<Vec<Coordinate>>,
    pub segment_count: usize,
    pub total_distance_m: f64,
    pub elevation_series: Vec<ElevationSample>,
    pub bounds: Option<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_serializes_as_lon_lat_pair() {
        let json = serde_json::to_string(&Coordinate::new(-117.7, 34.1)).unwrap();
        assert_eq!(json, "[-117.7,34.1]");

        let parsed: Coordinate = serde_json::from_str("[5.0,6.0]").unwrap();
        assert_eq!(parsed, Coordinate::new(5.0, 6.0));
    }

    #[test]
    fn intents_are_tagged_by_type() {
        let intent: EditIntent =
            serde_json::from_str(r#"{"type":"drag_end","index":2,"coord":[1.0,1.0]}"#).unwrap();
        assert_eq!(
            intent,
            EditIntent::DragEnd {
                index: 2,
                coord: Coordinate::new(1.0, 1.0)
            }
        );
        assert!(intent.is_commit());

        let reset: EditIntent = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(reset, EditIntent::Reset);

        let preview = EditIntent::DragMove {
            index: 0,
            coord: Coordinate::new(0.0, 0.0),
        };
        assert!(!preview.is_commit());
    }
}
