//! Edit state machine.
//!
//! `Idle` accepts appends, resets and drag starts. `Dragging` tracks a live
//! preview coordinate that is updated on every pointer move without touching
//! the store; geometry is only requested when the drag ends.

use serde::{Deserialize, Serialize};

use crate::aggregate::{RouteAggregate, RouteAggregator};
use crate::config::EditorConfig;
use crate::error::{RouteEditFailed, RouteError};
use crate::geometry::{validate, GeometryAdapter};
use crate::history::History;
use crate::models::{Coordinate, EditIntent, RouteSnapshot, Segment};
use crate::resolver::PositionResolver;
use crate::spatial::bounding_box;
use crate::store::{fetch_geometry, PendingEdit, SegmentRequest, SegmentStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EditState {
    #[default]
    Idle,
    Dragging { index: usize, preview: Coordinate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IgnoredIntent {
    IndexOutOfRange { index: usize, len: usize },
    NoActiveDrag { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditOutcome {
    Committed { changed_segments: Vec<usize> },
    Previewed,
    Ignored { reason: IgnoredIntent },
    Failed { notification: RouteEditFailed },
}

/// A commit waiting for segment geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    intent: EditIntent,
    edit: PendingEdit,
}

impl PendingCommit {
    pub fn intent(&self) -> EditIntent {
        self.intent
    }

    /// Segments to fetch, in the order `complete` expects them.
    pub fn requests(&self) -> &[SegmentRequest] {
        self.edit.requests()
    }
}

#[derive(Debug)]
pub enum Step {
    Done(EditOutcome),
    Fetch(PendingCommit),
}

#[derive(Debug, Clone, Default)]
struct RouteState {
    store: SegmentStore,
    aggregator: RouteAggregator,
}

/// Accepts edit intents and turns them into scoped store mutations.
#[derive(Debug, Clone)]
pub struct EditEngine {
    route: RouteState,
    state: EditState,
    history: History<RouteState>,
    notifications: Vec<RouteEditFailed>,
}

impl Default for EditEngine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditEngine {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            route: RouteState::default(),
            state: EditState::Idle,
            history: History::new(config.history_limit),
            notifications: Vec::new(),
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn waypoints(&self) -> &[Coordinate] {
        self.route.store.waypoints()
    }

    pub fn segments(&self) -> &[Segment] {
        self.route.store.segments()
    }

    pub fn aggregate(&self) -> &RouteAggregate {
        self.route.aggregator.aggregate()
    }

    /// Apply an intent, resolving geometry synchronously through `adapter`.
    pub fn apply<A>(&mut self, intent: EditIntent, adapter: &A) -> EditOutcome
    where
        A: GeometryAdapter + ?Sized,
    {
        match self.begin(intent) {
            Step::Done(outcome) => outcome,
            Step::Fetch(pending) => {
                let geometry = fetch_geometry(&pending.edit, adapter);
                self.complete(pending, geometry)
            }
        }
    }

    /// First half of an intent. Previews, ignores, resets and edits that need
    /// no geometry finish here; anything else comes back as `Step::Fetch`.
    pub fn begin(&mut self, intent: EditIntent) -> Step {
        let len = self.route.store.len();
        match intent {
            EditIntent::Append { coord } => {
                if let Err(source) = validate(coord) {
                    return Step::Done(self.fail(intent, RouteError::InvalidWaypoint { source }));
                }
                self.abandon_drag();
                let pending = PendingCommit {
                    intent,
                    edit: self.route.store.prepare_append(coord),
                };
                self.fetch_or_complete(pending)
            }
            EditIntent::DragStart { index } => {
                if index >= len {
                    return self.ignore(IgnoredIntent::IndexOutOfRange { index, len });
                }
                self.state = EditState::Dragging {
                    index,
                    preview: self.route.store.waypoints()[index],
                };
                Step::Done(EditOutcome::Previewed)
            }
            EditIntent::DragMove { index, coord } => match self.state {
                EditState::Dragging { index: active, .. } if active == index && index < len => {
                    self.state = EditState::Dragging {
                        index,
                        preview: coord,
                    };
                    Step::Done(EditOutcome::Previewed)
                }
                _ if index >= len => self.ignore(IgnoredIntent::IndexOutOfRange { index, len }),
                _ => self.ignore(IgnoredIntent::NoActiveDrag { index }),
            },
            EditIntent::DragEnd { index, coord } => {
                self.state = EditState::Idle;
                if index >= len {
                    return self.ignore(IgnoredIntent::IndexOutOfRange { index, len });
                }
                // A lone waypoint requests no geometry, so nothing else would catch it.
                if let Err(source) = validate(coord) {
                    return Step::Done(self.fail(intent, RouteError::InvalidWaypoint { source }));
                }
                match self.route.store.prepare_drag_end(index, coord) {
                    Ok(edit) => self.fetch_or_complete(PendingCommit { intent, edit }),
                    Err(_) => self.ignore(IgnoredIntent::IndexOutOfRange { index, len }),
                }
            }
            EditIntent::Reset => {
                self.abandon_drag();
                if !self.route.store.is_empty() {
                    self.history.record(self.route.clone());
                }
                self.route.store.reset();
                self.route.aggregator.clear();
                self.route.aggregator.recompute(self.route.store.segments(), &[]);
                tracing::info!("route reset");
                Step::Done(EditOutcome::Committed {
                    changed_segments: Vec::new(),
                })
            }
        }
    }

    /// Second half of an intent: install fetched geometry or roll back.
    pub fn complete(
        &mut self,
        pending: PendingCommit,
        geometry: Result<Vec<Segment>, RouteError>,
    ) -> EditOutcome {
        let PendingCommit { intent, edit } = pending;
        let geometry = match geometry {
            Ok(geometry) => geometry,
            Err(err) => return self.fail(intent, err),
        };

        let previous = self.route.clone();
        match self.route.store.apply(edit, geometry) {
            Ok(changed) => {
                self.route
                    .aggregator
                    .recompute(self.route.store.segments(), &changed);
                self.history.record(previous);
                tracing::info!(
                    waypoints = self.route.store.len(),
                    changed = ?changed,
                    total_distance_m = self.aggregate().total_distance_m,
                    "route edit committed"
                );
                EditOutcome::Committed {
                    changed_segments: changed,
                }
            }
            Err(err) => self.fail(intent, err),
        }
    }

    /// Restore the previous committed route. Abandons any drag preview.
    pub fn undo(&mut self) -> bool {
        self.abandon_drag();
        let current = std::mem::take(&mut self.route);
        let revision = current.store.revision();
        match self.history.undo(current) {
            Ok(restored) => {
                self.restore(restored, revision);
                true
            }
            Err(current) => {
                self.route = current;
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        self.abandon_drag();
        let current = std::mem::take(&mut self.route);
        let revision = current.store.revision();
        match self.history.redo(current) {
            Ok(restored) => {
                self.restore(restored, revision);
                true
            }
            Err(current) => {
                self.route = current;
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Straight connectors from the dragged waypoint's neighbours to the
    /// live preview coordinate. Empty unless dragging.
    pub fn preview_lines(&self) -> Vec<[Coordinate; 2]> {
        let EditState::Dragging { index, preview } = self.state else {
            return Vec::new();
        };
        let waypoints = self.route.store.waypoints();
        let mut lines = Vec::with_capacity(2);
        if let Some(prev) = index.checked_sub(1).and_then(|i| waypoints.get(i)) {
            lines.push([*prev, preview]);
        }
        if let Some(next) = waypoints.get(index + 1) {
            lines.push([preview, *next]);
        }
        lines
    }

    pub fn take_notifications(&mut self) -> Vec<RouteEditFailed> {
        std::mem::take(&mut self.notifications)
    }

    pub fn resolver(&self) -> PositionResolver {
        PositionResolver::new(self.segments())
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        let store = &self.route.store;
        let aggregate = self.aggregate();
        let lines: Vec<Vec<Coordinate>> = store
            .segments()
            .iter()
            .map(|segment| segment.coordinates.clone())
            .collect();
        let bounds = bounding_box(store.waypoints().iter().chain(lines.iter().flatten()));

        RouteSnapshot {
            waypoints: store.waypoints().to_vec(),
            segment_count: lines.len(),
            lines,
            total_distance_m: aggregate.total_distance_m,
            elevation_series: aggregate.elevation_series.clone(),
            bounds,
        }
    }

    fn fetch_or_complete(&mut self, pending: PendingCommit) -> Step {
        if pending.requests().is_empty() {
            Step::Done(self.complete(pending, Ok(Vec::new())))
        } else {
            Step::Fetch(pending)
        }
    }

    fn ignore(&self, reason: IgnoredIntent) -> Step {
        tracing::debug!(?reason, "ignoring edit intent");
        Step::Done(EditOutcome::Ignored { reason })
    }

    fn fail(&mut self, intent: EditIntent, err: RouteError) -> EditOutcome {
        tracing::warn!(?intent, error = %err, "route edit rolled back");
        let notification = RouteEditFailed::new(intent, &err);
        self.notifications.push(notification.clone());
        EditOutcome::Failed { notification }
    }

    fn abandon_drag(&mut self) {
        if let EditState::Dragging { index, .. } = self.state {
            tracing::debug!(index, "drag preview superseded");
            self.state = EditState::Idle;
        }
    }

    fn restore(&mut self, mut restored: RouteState, replaced_revision: u64) {
        restored.store.advance_revision_past(replaced_revision);
        self.route = restored;
    }
}
