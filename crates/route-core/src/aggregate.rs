//! Derived route totals: cumulative distance and the flattened elevation series.

use serde::{Deserialize, Serialize};

use crate::models::{ElevationSample, Segment};
use crate::units::DistanceUnit;

/// Totals derived from the segment list. Distances are always meters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteAggregate {
    pub total_distance_m: f64,
    /// `(cumulative distance, elevation)` pairs, non-decreasing in distance.
    pub elevation_series: Vec<ElevationSample>,
}

impl RouteAggregate {
    pub fn total_distance(&self, unit: DistanceUnit) -> f64 {
        unit.from_meters(self.total_distance_m)
    }

    pub fn is_empty(&self) -> bool {
        self.elevation_series.is_empty()
    }
}

/// Keeps per-segment start offsets so an edit only redoes the bookkeeping
/// from the lowest changed segment onwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteAggregator {
    /// Cumulative length before each segment
    offsets: Vec<f64>,
    aggregate: RouteAggregate,
    initialized: bool,
}

impl RouteAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregate(&self) -> &RouteAggregate {
        &self.aggregate
    }

    /// Distance from route start to the first vertex of `segment`.
    pub fn segment_offset(&self, segment: usize) -> Option<f64> {
        self.offsets.get(segment).copied()
    }

    /// Recompute after `changed` segments were replaced or appended.
    ///
    /// Offsets before the lowest changed index are reused. The elevation
    /// series is always rebuilt in full.
    pub fn recompute(&mut self, segments: &[Segment], changed: &[usize]) {
        let lowest = if self.initialized {
            changed.iter().copied().min().unwrap_or(usize::MAX)
        } else {
            0
        };
        let start = lowest.min(self.offsets.len()).min(segments.len());

        self.offsets.truncate(start);
        let mut running = match start {
            0 => 0.0,
            _ => self.offsets[start - 1] + segment_length(&segments[start - 1]),
        };
        for segment in &segments[start..] {
            self.offsets.push(running);
            running += segment_length(segment);
        }

        self.aggregate.total_distance_m = running;
        self.aggregate.elevation_series = flatten_elevation(segments, &self.offsets);
        self.initialized = true;

        tracing::debug!(
            from_segment = start,
            segments = segments.len(),
            total_distance_m = running,
            "recomputed route aggregate"
        );
    }

    /// Drop all state; the next recompute is a full one.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn segment_length(segment: &Segment) -> f64 {
    if segment.length_m.is_finite() && segment.length_m > 0.0 {
        segment.length_m
    } else {
        0.0
    }
}

fn flatten_elevation(segments: &[Segment], offsets: &[f64]) -> Vec<ElevationSample> {
    let capacity = segments.iter().map(|s| s.elevation.len()).sum();
    let mut series: Vec<ElevationSample> = Vec::with_capacity(capacity);
    let mut floor = 0.0_f64;

    for (segment, offset) in segments.iter().zip(offsets) {
        let ceiling = offset + segment_length(segment);
        for sample in &segment.elevation {
            // Clamp into the segment's span so adapter rounding can never make
            // the series step backwards across a boundary.
            let distance = (offset + sample.distance_m).clamp(floor, ceiling.max(floor));
            series.push(ElevationSample::new(distance, sample.elevation_m));
            floor = distance;
        }
    }

    series
}
