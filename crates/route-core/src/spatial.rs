//! Geodesic primitives over route lines, built on `geo`.
//!
//! Route lines are `LineString`s in `(lon, lat)` order. Every length is a
//! Haversine length in meters.

use geo::{
    BoundingRect, Closest, HaversineClosestPoint, HaversineDistance, HaversineIntermediate,
    HaversineLength, LineString, MultiPoint, Point,
};

use crate::models::{BoundingBox, Coordinate};

/// Haversine distance between two coordinates in meters.
pub fn distance_between(a: Coordinate, b: Coordinate) -> f64 {
    Point::from(a).haversine_distance(&Point::from(b))
}

/// Build a line from route coordinates.
pub fn to_line_string(coords: &[Coordinate]) -> LineString<f64> {
    coords.iter().copied().collect()
}

pub fn line_length(line: &LineString<f64>) -> f64 {
    line.haversine_length()
}

/// Point `distance_m` along a line.
///
/// Distances past the end resolve to the last vertex, non-positive distances
/// to the first. Returns `None` for an empty line.
pub fn point_at_distance(line: &LineString<f64>, distance_m: f64) -> Option<Coordinate> {
    let first = *line.0.first()?;
    if distance_m <= 0.0 || !distance_m.is_finite() {
        return Some(first.into());
    }

    let mut travelled = 0.0;
    for edge in line.lines() {
        let (start, end) = (edge.start_point(), edge.end_point());
        let step = start.haversine_distance(&end);
        if step > 0.0 && travelled + step >= distance_m {
            let fraction = (distance_m - travelled) / step;
            return Some(start.haversine_intermediate(&end, fraction).into());
        }
        travelled += step;
    }

    line.0.last().map(|&coord| coord.into())
}

/// Great-circle line from `a` to `b` with vertices roughly `spacing_m` apart.
///
/// Always contains both endpoints exactly; never more than `max_points` vertices.
pub fn densify_great_circle(
    a: Coordinate,
    b: Coordinate,
    spacing_m: f64,
    max_points: usize,
) -> Vec<Coordinate> {
    let distance = distance_between(a, b);
    let max_steps = max_points.max(2) - 1;
    let steps = if spacing_m > 0.0 && distance.is_finite() {
        ((distance / spacing_m).ceil() as usize).clamp(1, max_steps)
    } else {
        1
    };

    let (start, end) = (Point::from(a), Point::from(b));
    let mut points = Vec::with_capacity(steps + 1);
    points.push(a);
    if distance > 0.0 {
        for step in 1..steps {
            let fraction = step as f64 / steps as f64;
            points.push(start.haversine_intermediate(&end, fraction).into());
        }
    }
    points.push(b);
    points
}

/// Bounding box of all finite coordinates, `None` when there are none.
pub fn bounding_box<'a, I>(coords: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let points: MultiPoint<f64> = coords
        .into_iter()
        .filter(|coord| coord.is_finite())
        .map(|&coord| Point::from(coord))
        .collect();
    points.bounding_rect().map(BoundingBox::from)
}

/// Closest point of a line to some query coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    pub coordinate: Coordinate,
    /// Distance along the line from its first vertex
    pub distance_along_m: f64,
    /// Distance from the query coordinate to `coordinate`
    pub offset_m: f64,
}

/// Project `point` onto each edge of `line` and keep the closest hit.
pub fn nearest_point_on_line(line: &LineString<f64>, point: Coordinate) -> Option<NearestPoint> {
    let first = Point::from(*line.0.first()?);
    let query = Point::from(point);
    let mut best = NearestPoint {
        coordinate: first.into(),
        distance_along_m: 0.0,
        offset_m: first.haversine_distance(&query),
    };

    let mut travelled = 0.0;
    for edge in line.lines() {
        let start = edge.start_point();
        // Consecutive segments repeat their shared waypoint.
        if edge.start == edge.end {
            continue;
        }
        let candidate = match edge.haversine_closest_point(&query) {
            Closest::Intersection(hit) | Closest::SinglePoint(hit) => hit,
            Closest::Indeterminate => start,
        };
        let offset = candidate.haversine_distance(&query);
        if offset < best.offset_m {
            best = NearestPoint {
                coordinate: candidate.into(),
                distance_along_m: travelled + start.haversine_distance(&candidate),
                offset_m: offset,
            };
        }
        travelled += start.haversine_distance(&edge.end_point());
    }

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> LineString<f64> {
        to_line_string(&[
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 2.0),
        ])
    }

    fn one_degree() -> f64 {
        distance_between(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0))
    }

    #[test]
    fn one_degree_of_latitude() {
        assert!((one_degree() - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn line_length_sums_edges() {
        assert!((line_length(&line()) - 2.0 * one_degree()).abs() < 1e-6);
        assert_eq!(line_length(&to_line_string(&[Coordinate::new(3.0, 3.0)])), 0.0);
    }

    #[test]
    fn point_at_distance_walks_the_line() {
        let line = line();

        let mid = point_at_distance(&line, one_degree() * 1.5).unwrap();
        assert!(mid.lon.abs() < 1e-9);
        assert!((mid.lat - 1.5).abs() < 1e-6);

        let past_end = point_at_distance(&line, one_degree() * 10.0).unwrap();
        assert_eq!(past_end, Coordinate::new(0.0, 2.0));
        assert_eq!(point_at_distance(&line, 0.0), Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(point_at_distance(&to_line_string(&[]), 10.0), None);
    }

    #[test]
    fn densify_keeps_endpoints_and_caps_vertices() {
        let a = Coordinate::new(-117.72, 34.10);
        let b = Coordinate::new(-117.70, 34.12);
        let dense = densify_great_circle(a, b, 100.0, 500);
        assert_eq!(dense.first(), Some(&a));
        assert_eq!(dense.last(), Some(&b));
        assert!(dense.len() > 2);
        // Densifying along the arc should not change its length noticeably.
        assert!((line_length(&to_line_string(&dense)) - distance_between(a, b)).abs() < 0.01);

        let capped = densify_great_circle(a, b, 1.0, 8);
        assert_eq!(capped.len(), 8);

        let degenerate = densify_great_circle(a, a, 100.0, 500);
        assert_eq!(degenerate, vec![a, a]);
    }

    #[test]
    fn nearest_point_projects_onto_edges() {
        let hit = nearest_point_on_line(&line(), Coordinate::new(0.01, 0.5)).unwrap();
        assert!(hit.coordinate.lon.abs() < 1e-6);
        assert!((hit.coordinate.lat - 0.5).abs() < 1e-3);
        assert!((hit.distance_along_m - one_degree() / 2.0).abs() < 200.0);
        assert!(hit.offset_m > 1_000.0 && hit.offset_m < 1_200.0);

        let beyond = nearest_point_on_line(&line(), Coordinate::new(0.0, 3.0)).unwrap();
        assert!((beyond.coordinate.lat - 2.0).abs() < 1e-6);
        assert!((beyond.distance_along_m - 2.0 * one_degree()).abs() < 1.0);
    }

    #[test]
    fn bounding_box_skips_non_finite() {
        let coords = vec![
            Coordinate::new(1.0, 5.0),
            Coordinate::new(f64::NAN, 0.0),
            Coordinate::new(-2.0, 7.0),
        ];
        let bounds = bounding_box(&coords).unwrap();
        assert_eq!(bounds.min_lon, -2.0);
        assert_eq!(bounds.max_lon, 1.0);
        assert_eq!(bounds.min_lat, 5.0);
        assert_eq!(bounds.max_lat, 7.0);
        assert!(bounding_box(&Vec::<Coordinate>::new()).is_none());
    }
}
