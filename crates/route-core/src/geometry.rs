//! Geometry adapter contract and the built-in great-circle implementation.

use crate::config::EditorConfig;
use crate::error::GeometryError;
use crate::models::{Coordinate, ElevationSample, Segment};
use crate::spatial::{densify_great_circle, distance_between};

/// Resolves the path between two waypoints.
///
/// Implementations may snap to a surface, so the returned line can differ
/// from the straight line between the endpoints.
pub trait GeometryAdapter {
    fn segment_geometry(&self, from: Coordinate, to: Coordinate)
        -> Result<Segment, GeometryError>;
}

impl<A: GeometryAdapter + ?Sized> GeometryAdapter for &A {
    fn segment_geometry(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Segment, GeometryError> {
        (**self).segment_geometry(from, to)
    }
}

/// Terrain height lookup.
pub trait ElevationSource {
    /// Elevation in meters, `None` if the point cannot be sampled.
    fn elevation_at(&self, coord: Coordinate) -> Option<f64>;
}

/// Terrain at a constant height.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain(pub f64);

impl ElevationSource for FlatTerrain {
    fn elevation_at(&self, _coord: Coordinate) -> Option<f64> {
        Some(self.0)
    }
}

/// Straight great-circle segments sampled against an elevation source.
#[derive(Debug, Clone)]
pub struct GreatCircleAdapter<E> {
    elevation: E,
    sample_spacing_m: f64,
    max_samples: usize,
}

impl<E: ElevationSource> GreatCircleAdapter<E> {
    pub fn new(elevation: E, sample_spacing_m: f64, max_samples: usize) -> Self {
        Self {
            elevation,
            sample_spacing_m,
            max_samples,
        }
    }

    pub fn from_config(elevation: E, config: &EditorConfig) -> Self {
        Self::new(
            elevation,
            config.sample_spacing_m,
            config.max_samples_per_segment,
        )
    }
}

impl<E: ElevationSource> GeometryAdapter for GreatCircleAdapter<E> {
    fn segment_geometry(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Segment, GeometryError> {
        validate(from)?;
        validate(to)?;

        let coordinates = densify_great_circle(from, to, self.sample_spacing_m, self.max_samples);
        let elevations = coordinates
            .iter()
            .map(|coord| {
                self.elevation.elevation_at(*coord).ok_or_else(|| {
                    GeometryError::Unavailable(format!(
                        "no elevation at ({:.6}, {:.6})",
                        coord.lon, coord.lat
                    ))
                })
            })
            .collect::<Result<Vec<f64>, GeometryError>>()?;

        Ok(segment_from_samples(coordinates, &elevations))
    }
}

/// Reject coordinates that cannot be placed on a map.
pub fn validate(coord: Coordinate) -> Result<(), GeometryError> {
    let in_range = (-180.0..=180.0).contains(&coord.lon) && (-90.0..=90.0).contains(&coord.lat);
    if coord.is_finite() && in_range {
        Ok(())
    } else {
        Err(GeometryError::InvalidCoordinate {
            lon: coord.lon,
            lat: coord.lat,
        })
    }
}

/// Build a segment from a dense line and one elevation per vertex.
///
/// Sample distances are cumulative Haversine lengths along the line. Missing
/// trailing elevations repeat the last known value (or 0 when none).
pub fn segment_from_samples(coordinates: Vec<Coordinate>, elevations: &[f64]) -> Segment {
    let mut elevation = Vec::with_capacity(coordinates.len());
    let mut travelled = 0.0;
    let mut last_elevation = 0.0;
    for (idx, coord) in coordinates.iter().enumerate() {
        if idx > 0 {
            travelled += distance_between(coordinates[idx - 1], *coord);
        }
        if let Some(value) = elevations.get(idx).copied().filter(|v| v.is_finite()) {
            last_elevation = value;
        }
        elevation.push(ElevationSample::new(travelled, last_elevation));
    }

    Segment {
        coordinates,
        length_m: travelled,
        elevation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp;

    impl ElevationSource for Ramp {
        fn elevation_at(&self, coord: Coordinate) -> Option<f64> {
            Some(coord.lat * 1000.0)
        }
    }

    struct Void;

    impl ElevationSource for Void {
        fn elevation_at(&self, _coord: Coordinate) -> Option<f64> {
            None
        }
    }

    #[test]
    fn great_circle_segment_is_self_consistent() {
        let adapter = GreatCircleAdapter::new(Ramp, 1_000.0, 500);
        let segment = adapter
            .segment_geometry(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.1))
            .unwrap();

        assert_eq!(segment.coordinates.len(), segment.elevation.len());
        assert!(segment.coordinates.len() > 2);
        let last = segment.elevation.last().unwrap();
        assert!((last.distance_m - segment.length_m).abs() < 1e-9);
        assert!((last.elevation_m - 100.0).abs() < 1e-6);
        assert!(segment
            .elevation
            .windows(2)
            .all(|pair| pair[0].distance_m <= pair[1].distance_m));
    }

    #[test]
    fn missing_elevation_is_unavailable() {
        let adapter = GreatCircleAdapter::new(Void, 50.0, 500);
        let result = adapter.segment_geometry(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01));
        assert!(matches!(result, Err(GeometryError::Unavailable(_))));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let adapter = GreatCircleAdapter::new(FlatTerrain(0.0), 50.0, 500);
        let result = adapter.segment_geometry(Coordinate::new(0.0, 0.0), Coordinate::new(200.0, 0.0));
        assert!(matches!(result, Err(GeometryError::InvalidCoordinate { .. })));
    }

    #[test]
    fn segment_from_samples_carries_last_elevation_forward() {
        let coords = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.001),
            Coordinate::new(0.0, 0.002),
        ];
        let segment = segment_from_samples(coords, &[10.0, f64::NAN]);
        let elevations: Vec<f64> = segment.elevation.iter().map(|s| s.elevation_m).collect();
        assert_eq!(elevations, vec![10.0, 10.0, 10.0]);
    }
}
