//! Ordered waypoints and the segments connecting them.
//!
//! Every committing edit runs in two phases. `prepare_*` validates the edit
//! and lists the segment geometry it needs without touching the store;
//! `apply` installs the fetched geometry. A failed fetch therefore never
//! leaves a half-applied edit behind.

use crate::error::RouteError;
use crate::geometry::GeometryAdapter;
use crate::models::{Coordinate, Segment};

/// Geometry needed for one segment of a pending edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRequest {
    pub segment: usize,
    pub from: Coordinate,
    pub to: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEdit {
    Append(Coordinate),
    Move { index: usize, to: Coordinate },
}

/// An edit validated against a specific store revision.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    edit: StoreEdit,
    revision: u64,
    requests: Vec<SegmentRequest>,
}

impl PendingEdit {
    pub fn edit(&self) -> StoreEdit {
        self.edit
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn requests(&self) -> &[SegmentRequest] {
        &self.requests
    }
}

/// Owns the route's waypoints and segments.
///
/// Invariant: `segments.len() == max(waypoints.len() - 1, 0)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentStore {
    waypoints: Vec<Coordinate>,
    segments: Vec<Segment>,
    revision: u64,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoints(&self) -> &[Coordinate] {
        &self.waypoints
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Incremented on every committed mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn prepare_append(&self, coord: Coordinate) -> PendingEdit {
        let requests = match self.waypoints.last() {
            Some(&last) => vec![SegmentRequest {
                segment: self.segments.len(),
                from: last,
                to: coord,
            }],
            None => Vec::new(),
        };

        PendingEdit {
            edit: StoreEdit::Append(coord),
            revision: self.revision,
            requests,
        }
    }

    /// Plan moving waypoint `index` to `coord`.
    ///
    /// Only the segments touching `index` are requested: segment 0 for the
    /// first waypoint, the last segment for the last waypoint, both
    /// neighbours for an interior waypoint, and none for a lone waypoint.
    pub fn prepare_drag_end(
        &self,
        index: usize,
        coord: Coordinate,
    ) -> Result<PendingEdit, RouteError> {
        let len = self.waypoints.len();
        if index >= len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }

        let mut requests = Vec::with_capacity(2);
        if index > 0 {
            requests.push(SegmentRequest {
                segment: index - 1,
                from: self.waypoints[index - 1],
                to: coord,
            });
        }
        if index + 1 < len {
            requests.push(SegmentRequest {
                segment: index,
                from: coord,
                to: self.waypoints[index + 1],
            });
        }

        Ok(PendingEdit {
            edit: StoreEdit::Move { index, to: coord },
            revision: self.revision,
            requests,
        })
    }

    /// Install geometry for a prepared edit, one segment per request in order.
    ///
    /// Returns the indices of the segments that changed, ascending.
    pub fn apply(
        &mut self,
        pending: PendingEdit,
        geometry: Vec<Segment>,
    ) -> Result<Vec<usize>, RouteError> {
        if pending.revision != self.revision {
            return Err(RouteError::StaleCommit {
                prepared: pending.revision,
                current: self.revision,
            });
        }
        if geometry.len() != pending.requests.len() {
            return Err(RouteError::GeometryCountMismatch {
                expected: pending.requests.len(),
                actual: geometry.len(),
            });
        }

        let changed: Vec<usize> = pending.requests.iter().map(|req| req.segment).collect();
        match pending.edit {
            StoreEdit::Append(coord) => {
                self.waypoints.push(coord);
                self.segments.extend(geometry);
            }
            StoreEdit::Move { index, to } => {
                self.waypoints[index] = to;
                for (request, segment) in pending.requests.iter().zip(geometry) {
                    self.segments[request.segment] = segment;
                }
            }
        }
        self.revision += 1;

        debug_assert_eq!(self.segments.len(), self.waypoints.len().saturating_sub(1));
        Ok(changed)
    }

    pub fn append<A>(&mut self, coord: Coordinate, adapter: &A) -> Result<Vec<usize>, RouteError>
    where
        A: GeometryAdapter + ?Sized,
    {
        let pending = self.prepare_append(coord);
        let geometry = fetch_geometry(&pending, adapter)?;
        self.apply(pending, geometry)
    }

    pub fn drag_end<A>(
        &mut self,
        index: usize,
        coord: Coordinate,
        adapter: &A,
    ) -> Result<Vec<usize>, RouteError>
    where
        A: GeometryAdapter + ?Sized,
    {
        let pending = self.prepare_drag_end(index, coord)?;
        let geometry = fetch_geometry(&pending, adapter)?;
        self.apply(pending, geometry)
    }

    pub fn reset(&mut self) {
        self.waypoints.clear();
        self.segments.clear();
        self.revision += 1;
    }

    /// Keep revisions monotonic when an older store value is restored.
    pub(crate) fn advance_revision_past(&mut self, revision: u64) {
        self.revision = self.revision.max(revision) + 1;
    }
}

/// Resolve every request of a pending edit, stopping at the first failure.
pub fn fetch_geometry<A>(pending: &PendingEdit, adapter: &A) -> Result<Vec<Segment>, RouteError>
where
    A: GeometryAdapter + ?Sized,
{
    pending
        .requests()
        .iter()
        .map(|req| {
            adapter
                .segment_geometry(req.from, req.to)
                .map_err(|source| RouteError::GeometryUnavailable {
                    segment: req.segment,
                    source,
                })
        })
        .collect()
}
