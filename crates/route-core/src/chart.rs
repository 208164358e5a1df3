//! Elevation profile geometry: scales, the rendered curve and pointer readouts.
//!
//! Nothing here draws. The chart layer renders `ElevationChart::path()` and
//! feeds pointer positions back through `resolve_pointer`.

use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, ElevationSample};
use crate::resolver::{search_screen_x, ArcLengthPath, PositionResolver, ScreenPoint};
use crate::units::DistanceUnit;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl ChartDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn bounded_width(&self) -> f64 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    pub fn bounded_height(&self) -> f64 {
        (self.height - self.margin_top - self.margin_bottom).max(0.0)
    }
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 250.0,
            margin_top: 20.0,
            margin_right: 30.0,
            margin_bottom: 20.0,
            margin_left: 50.0,
        }
    }
}

/// Continuous linear mapping from a domain onto a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn scale(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return (self.range.0 + self.range.1) / 2.0;
        }
        let t = (value - self.domain.0) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            return (self.domain.0 + self.domain.1) / 2.0;
        }
        let t = (pixel - self.range.0) / span;
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }
}

/// The rendered profile line with a precomputed arc-length table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePath {
    points: Vec<ScreenPoint>,
    cumulative: Vec<f64>,
}

impl ProfilePath {
    pub fn new(points: Vec<ScreenPoint>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut running = 0.0;
        for (idx, point) in points.iter().enumerate() {
            if idx > 0 {
                let prev = points[idx - 1];
                running += ((point.x - prev.x).powi(2) + (point.y - prev.y).powi(2)).sqrt();
            }
            cumulative.push(running);
        }
        Self { points, cumulative }
    }

    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }
}

impl ArcLengthPath for ProfilePath {
    fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn point_at_length(&self, length: f64) -> ScreenPoint {
        let Some(&first) = self.points.first() else {
            return ScreenPoint::new(0.0, 0.0);
        };
        let idx = self.cumulative.partition_point(|&c| c < length);
        if idx == 0 {
            return first;
        }
        let Some(&next) = self.points.get(idx) else {
            return self.points[self.points.len() - 1];
        };
        let prev = self.points[idx - 1];
        let span = self.cumulative[idx] - self.cumulative[idx - 1];
        if span <= 0.0 {
            return next;
        }
        let t = (length - self.cumulative[idx - 1]) / span;
        ScreenPoint::new(prev.x + (next.x - prev.x) * t, prev.y + (next.y - prev.y) * t)
    }
}

/// What the chart and map show for the current pointer position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorReadout {
    pub distance_m: f64,
    pub elevation_m: f64,
    /// Position on the curve, relative to the plotted area
    pub point: ScreenPoint,
    /// Map cursor; `None` at the very start of the route
    pub coordinate: Option<Coordinate>,
    pub distance_label: String,
    pub elevation_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElevationChart {
    dimensions: ChartDimensions,
    x_scale: LinearScale,
    y_scale: LinearScale,
    path: ProfilePath,
}

impl ElevationChart {
    /// Lay out the series in the plotted area. `None` for an empty series.
    pub fn new(series: &[ElevationSample], dimensions: ChartDimensions) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let max_distance = series
            .iter()
            .map(|s| s.distance_m)
            .fold(0.0_f64, f64::max);
        let (min_elevation, max_elevation) = series.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), s| (lo.min(s.elevation_m), hi.max(s.elevation_m)),
        );

        let x_scale = LinearScale::new((0.0, max_distance), (0.0, dimensions.bounded_width()));
        let y_scale = LinearScale::new(
            (min_elevation, max_elevation),
            (dimensions.bounded_height(), 0.0),
        );
        let points = series
            .iter()
            .map(|s| ScreenPoint::new(x_scale.scale(s.distance_m), y_scale.scale(s.elevation_m)))
            .collect();

        Some(Self {
            dimensions,
            x_scale,
            y_scale,
            path: ProfilePath::new(points),
        })
    }

    pub fn dimensions(&self) -> ChartDimensions {
        self.dimensions
    }

    pub fn x_scale(&self) -> LinearScale {
        self.x_scale
    }

    pub fn y_scale(&self) -> LinearScale {
        self.y_scale
    }

    pub fn path(&self) -> &ProfilePath {
        &self.path
    }

    /// Distance in meters under a pointer at `pixel_x` (plotted-area space).
    pub fn pointer_to_distance(&self, pixel_x: f64) -> Option<f64> {
        search_screen_x(&self.path, pixel_x).map(|hit| self.x_scale.invert(hit.point.x))
    }

    /// Resolve a chart pointer to a readout and the matching map coordinate.
    pub fn resolve_pointer(
        &self,
        pixel_x: f64,
        resolver: &PositionResolver,
        unit: DistanceUnit,
    ) -> Option<CursorReadout> {
        let hit = search_screen_x(&self.path, pixel_x)?;
        let distance_m = self.x_scale.invert(hit.point.x).max(0.0);
        let elevation_m = self.y_scale.invert(hit.point.y);
        Some(CursorReadout {
            distance_m,
            elevation_m,
            point: hit.point,
            coordinate: resolver.distance_to_coordinate(distance_m),
            distance_label: unit.format_distance(distance_m),
            elevation_label: unit.format_elevation(elevation_m),
        })
    }

    /// Chart x for a distance along the route, e.g. from a map hover.
    pub fn distance_to_pixel_x(&self, distance_m: f64) -> f64 {
        self.x_scale
            .scale(distance_m)
            .clamp(0.0, self.dimensions.bounded_width())
    }
}
