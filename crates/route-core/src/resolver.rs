//! Mapping between distance along the route, map coordinates and the
//! rendered elevation curve, used to keep the map and chart cursors in sync.

use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, Segment};
use crate::spatial::{line_length, nearest_point_on_line, point_at_distance};
use crate::units::DistanceUnit;

/// A point in chart screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Arc-length parameterisation of a rendered path.
pub trait ArcLengthPath {
    fn total_length(&self) -> f64;
    /// Screen position `length` units along the path, clamped to its ends.
    fn point_at_length(&self, length: f64) -> ScreenPoint;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathHit {
    pub length: f64,
    pub point: ScreenPoint,
}

/// Binary search for the arc length whose screen x is closest to `pixel_x`.
///
/// The path's x must be non-decreasing in arc length. Probes whole arc-length
/// units, so the cost is O(log n) in the rendered length. Pointers outside the
/// path's horizontal extent clamp to the nearest end. Returns `None` for a
/// path with no length.
pub fn search_screen_x<P>(path: &P, pixel_x: f64) -> Option<PathHit>
where
    P: ArcLengthPath + ?Sized,
{
    let total = path.total_length();
    if !total.is_finite() || total <= 0.0 || !pixel_x.is_finite() {
        return None;
    }

    let start = path.point_at_length(0.0);
    if pixel_x <= start.x {
        return Some(PathHit {
            length: 0.0,
            point: start,
        });
    }
    let end = path.point_at_length(total);
    if pixel_x >= end.x {
        return Some(PathHit {
            length: total,
            point: end,
        });
    }

    let last_sample = total.floor();
    let mut lo = 0.0_f64;
    let mut hi = last_sample;
    while hi - lo > 1.0 {
        let target = ((lo + hi) / 2.0).floor();
        let pos = path.point_at_length(target);
        if pos.x > pixel_x {
            hi = target;
        } else if pos.x < pixel_x {
            lo = target;
        } else {
            return Some(PathHit {
                length: target,
                point: pos,
            });
        }
    }

    // Interval collapsed: take whichever neighbouring sample lands closer.
    let mut candidates = vec![lo, hi];
    if hi == last_sample && total > last_sample {
        candidates.push(total);
    }
    candidates
        .into_iter()
        .map(|length| PathHit {
            length,
            point: path.point_at_length(length),
        })
        .min_by(|a, b| {
            (a.point.x - pixel_x)
                .abs()
                .total_cmp(&(b.point.x - pixel_x).abs())
        })
}

/// Resolves positions along the full concatenated route line.
///
/// Built from the current segments; a route without segments yields a
/// resolver that answers every query with `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionResolver {
    line: LineString<f64>,
    total_m: f64,
}

impl Default for PositionResolver {
    fn default() -> Self {
        Self {
            line: LineString::new(Vec::new()),
            total_m: 0.0,
        }
    }
}

impl PositionResolver {
    pub fn new(segments: &[Segment]) -> Self {
        let line: LineString<f64> = segments
            .iter()
            .flat_map(|segment| segment.coordinates.iter().copied())
            .collect();
        if line.0.len() < 2 {
            return Self::default();
        }
        let total_m = line_length(&line);
        Self { line, total_m }
    }

    pub fn is_empty(&self) -> bool {
        self.line.0.len() < 2
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_m
    }

    /// Map cursor for a distance along the route.
    ///
    /// Zero means "no cursor", as do negative or non-finite distances.
    pub fn distance_to_coordinate(&self, distance_m: f64) -> Option<Coordinate> {
        if self.is_empty() || !distance_m.is_finite() || distance_m <= 0.0 {
            return None;
        }
        point_at_distance(&self.line, distance_m)
    }

    /// Distance along the route of the point nearest to `coord`.
    pub fn coordinate_to_distance(&self, coord: Coordinate) -> Option<f64> {
        if self.is_empty() || !coord.is_finite() {
            return None;
        }
        nearest_point_on_line(&self.line, coord).map(|hit| hit.distance_along_m)
    }

    /// Coordinates at every whole `unit` along the route, excluding the start.
    pub fn distance_markers(&self, unit: DistanceUnit) -> Vec<Coordinate> {
        if self.is_empty() {
            return Vec::new();
        }
        let whole_units = unit.from_meters(self.total_m).floor() as usize;
        (1..=whole_units)
            .filter_map(|step| point_at_distance(&self.line, unit.to_meters(step as f64)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FlatTerrain, GeometryAdapter, GreatCircleAdapter};
    use crate::spatial::distance_between;

    /// A polyline in screen space, x increasing.
    struct Polyline(Vec<ScreenPoint>);

    impl ArcLengthPath for Polyline {
        fn total_length(&self) -> f64 {
            self.0
                .windows(2)
                .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
                .sum()
        }

        fn point_at_length(&self, length: f64) -> ScreenPoint {
            let mut remaining = length.max(0.0);
            for w in self.0.windows(2) {
                let step = ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt();
                if remaining <= step && step > 0.0 {
                    let t = remaining / step;
                    return ScreenPoint::new(
                        w[0].x + (w[1].x - w[0].x) * t,
                        w[0].y + (w[1].y - w[0].y) * t,
                    );
                }
                remaining -= step;
            }
            *self.0.last().unwrap()
        }
    }

    fn segments(points: &[Coordinate]) -> Vec<Segment> {
        let adapter = GreatCircleAdapter::new(FlatTerrain(0.0), 200.0, 500);
        points
            .windows(2)
            .map(|w| adapter.segment_geometry(w[0], w[1]).unwrap())
            .collect()
    }

    #[test]
    fn search_finds_closest_sample() {
        let path = Polyline(vec![
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(100.0, 0.0),
            ScreenPoint::new(200.0, 50.0),
        ]);
        let hit = search_screen_x(&path, 42.3).unwrap();
        assert!((hit.point.x - 42.3).abs() <= 1.0);

        let hit = search_screen_x(&path, 150.0).unwrap();
        assert!((hit.point.x - 150.0).abs() <= 1.0);
        assert!(hit.point.y > 20.0 && hit.point.y < 30.0);
    }

    #[test]
    fn search_clamps_outside_bounds() {
        let path = Polyline(vec![ScreenPoint::new(10.0, 5.0), ScreenPoint::new(90.0, 5.0)]);
        let before = search_screen_x(&path, -30.0).unwrap();
        assert_eq!(before.length, 0.0);
        assert_eq!(before.point, ScreenPoint::new(10.0, 5.0));

        let after = search_screen_x(&path, 1_000.0).unwrap();
        assert_eq!(after.length, 80.0);
        assert_eq!(after.point, ScreenPoint::new(90.0, 5.0));
    }

    #[test]
    fn search_on_empty_path_is_none() {
        let path = Polyline(vec![ScreenPoint::new(3.0, 3.0)]);
        assert!(search_screen_x(&path, 3.0).is_none());
    }

    #[test]
    fn distance_to_coordinate_walks_concatenated_segments() {
        let resolver = PositionResolver::new(&segments(&[
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.01),
            Coordinate::new(0.01, 0.01),
        ]));
        let first_leg = distance_between(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01));

        let coord = resolver.distance_to_coordinate(first_leg + 10.0).unwrap();
        assert!((coord.lat - 0.01).abs() < 1e-6);
        assert!(coord.lon > 0.0);

        assert!(resolver.distance_to_coordinate(0.0).is_none());
        assert!(resolver.distance_to_coordinate(-5.0).is_none());
    }

    #[test]
    fn coordinate_to_distance_inverts_distance_to_coordinate() {
        let resolver = PositionResolver::new(&segments(&[
            Coordinate::new(-117.72, 34.10),
            Coordinate::new(-117.71, 34.11),
            Coordinate::new(-117.70, 34.10),
        ]));
        let distance = resolver.total_distance_m() * 0.6;
        let coord = resolver.distance_to_coordinate(distance).unwrap();
        let back = resolver.coordinate_to_distance(coord).unwrap();
        assert!((back - distance).abs() < 1.0, "{back} vs {distance}");
    }

    #[test]
    fn empty_route_resolver_is_a_no_op() {
        let resolver = PositionResolver::new(&[]);
        assert!(resolver.is_empty());
        assert!(resolver.distance_to_coordinate(100.0).is_none());
        assert!(resolver
            .coordinate_to_distance(Coordinate::new(0.0, 0.0))
            .is_none());
        assert!(resolver.distance_markers(DistanceUnit::Kilometers).is_empty());
    }

    #[test]
    fn markers_fall_on_whole_units() {
        // ~2.2 km north.
        let resolver = PositionResolver::new(&segments(&[
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.02),
        ]));
        let markers = resolver.distance_markers(DistanceUnit::Kilometers);
        assert_eq!(markers.len(), 2);
        let origin = Coordinate::new(0.0, 0.0);
        assert!((distance_between(origin, markers[0]) - 1_000.0).abs() < 1.0);
        assert!((distance_between(origin, markers[1]) - 2_000.0).abs() < 1.0);
        assert!(resolver.distance_markers(DistanceUnit::Miles).len() == 1);
    }
}
