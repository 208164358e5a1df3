//! Editing sessions.
//!
//! Each session owns one [`EditEngine`] inside a task that drains a bounded
//! command queue. Commits that need geometry are awaited before the next
//! command is taken, so intents apply strictly in arrival order and no two
//! commits are ever in flight against the same route.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use route_core::{
    ChartDimensions, Coordinate, CursorReadout, DistanceUnit, EditEngine, EditIntent,
    EditOutcome, EditState, EditorConfig, ElevationChart, RouteEditFailed, RouteError,
    RouteSnapshot, Segment, SegmentRequest, Step,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::cache::CacheEntry;
use crate::geometry::AsyncGeometryAdapter;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} is closed")]
    Closed(Uuid),
}

/// Result of one intent, with the route as it stands afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct IntentResponse {
    pub outcome: EditOutcome,
    pub state: EditState,
    pub preview_lines: Vec<[Coordinate; 2]>,
    pub notifications: Vec<RouteEditFailed>,
    pub snapshot: RouteSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub applied: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub snapshot: RouteSnapshot,
}

enum SessionCommand {
    Intent {
        intent: EditIntent,
        reply: oneshot::Sender<IntentResponse>,
    },
    Snapshot {
        reply: oneshot::Sender<RouteSnapshot>,
    },
    Undo {
        reply: oneshot::Sender<HistoryResponse>,
    },
    Redo {
        reply: oneshot::Sender<HistoryResponse>,
    },
    Cursor {
        distance_m: f64,
        reply: oneshot::Sender<Option<Coordinate>>,
    },
    Nearest {
        coord: Coordinate,
        reply: oneshot::Sender<Option<f64>>,
    },
    Markers {
        unit: DistanceUnit,
        reply: oneshot::Sender<Vec<Coordinate>>,
    },
    ChartPointer {
        dimensions: ChartDimensions,
        pixel_x: f64,
        unit: DistanceUnit,
        reply: oneshot::Sender<Option<CursorReadout>>,
    },
}

/// Cheap, cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    created_at: DateTime<Utc>,
    opened: Instant,
    /// Milliseconds after `opened` of the most recent request
    last_used_ms: Arc<AtomicU64>,
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Start a session task. It stops once every handle is dropped.
    pub fn spawn(
        adapter: Arc<dyn AsyncGeometryAdapter>,
        editor: &EditorConfig,
        queue_depth: usize,
    ) -> Self {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        tokio::spawn(run_session(id, EditEngine::new(editor), adapter, rx));
        tracing::info!(%id, "session started");
        Self {
            id,
            created_at: Utc::now(),
            opened: Instant::now(),
            last_used_ms: Arc::new(AtomicU64::new(0)),
            tx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used(&self) -> Instant {
        self.opened + Duration::from_millis(self.last_used_ms.load(Ordering::Relaxed))
    }

    fn touch(&self) {
        let elapsed = u64::try_from(self.opened.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_used_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    /// Queue an intent without waiting for it to apply.
    pub async fn enqueue(
        &self,
        intent: EditIntent,
    ) -> Result<oneshot::Receiver<IntentResponse>, SessionError> {
        self.touch();
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Intent { intent, reply })
            .await
            .map_err(|_| SessionError::Closed(self.id))?;
        Ok(rx)
    }

    pub async fn apply(&self, intent: EditIntent) -> Result<IntentResponse, SessionError> {
        self.enqueue(intent)
            .await?
            .await
            .map_err(|_| SessionError::Closed(self.id))
    }

    pub async fn snapshot(&self) -> Result<RouteSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    pub async fn undo(&self) -> Result<HistoryResponse, SessionError> {
        self.request(|reply| SessionCommand::Undo { reply }).await
    }

    pub async fn redo(&self) -> Result<HistoryResponse, SessionError> {
        self.request(|reply| SessionCommand::Redo { reply }).await
    }

    pub async fn cursor(&self, distance_m: f64) -> Result<Option<Coordinate>, SessionError> {
        self.request(|reply| SessionCommand::Cursor { distance_m, reply })
            .await
    }

    pub async fn nearest(&self, coord: Coordinate) -> Result<Option<f64>, SessionError> {
        self.request(|reply| SessionCommand::Nearest { coord, reply })
            .await
    }

    pub async fn markers(&self, unit: DistanceUnit) -> Result<Vec<Coordinate>, SessionError> {
        self.request(|reply| SessionCommand::Markers { unit, reply })
            .await
    }

    /// Resolve a pointer over an elevation chart of the given size.
    pub async fn chart_pointer(
        &self,
        dimensions: ChartDimensions,
        pixel_x: f64,
        unit: DistanceUnit,
    ) -> Result<Option<CursorReadout>, SessionError> {
        self.request(|reply| SessionCommand::ChartPointer {
            dimensions,
            pixel_x,
            unit,
            reply,
        })
        .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        self.touch();
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| SessionError::Closed(self.id))?;
        rx.await.map_err(|_| SessionError::Closed(self.id))
    }
}

impl CacheEntry for SessionHandle {
    fn fetched_at(&self) -> Instant {
        self.last_used()
    }
}

async fn run_session(
    id: Uuid,
    mut engine: EditEngine,
    adapter: Arc<dyn AsyncGeometryAdapter>,
    mut rx: mpsc::Receiver<SessionCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            SessionCommand::Intent { intent, reply } => {
                let outcome = apply_intent(&mut engine, adapter.as_ref(), intent).await;
                if let EditOutcome::Failed { notification } = &outcome {
                    tracing::warn!(%id, "edit rolled back: {}", notification.message);
                }
                let response = IntentResponse {
                    outcome,
                    state: engine.state(),
                    preview_lines: engine.preview_lines(),
                    notifications: engine.take_notifications(),
                    snapshot: engine.snapshot(),
                };
                let _ = reply.send(response);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(engine.snapshot());
            }
            SessionCommand::Undo { reply } => {
                let applied = engine.undo();
                let _ = reply.send(history_response(&engine, applied));
            }
            SessionCommand::Redo { reply } => {
                let applied = engine.redo();
                let _ = reply.send(history_response(&engine, applied));
            }
            SessionCommand::Cursor { distance_m, reply } => {
                let _ = reply.send(engine.resolver().distance_to_coordinate(distance_m));
            }
            SessionCommand::Nearest { coord, reply } => {
                let _ = reply.send(engine.resolver().coordinate_to_distance(coord));
            }
            SessionCommand::Markers { unit, reply } => {
                let _ = reply.send(engine.resolver().distance_markers(unit));
            }
            SessionCommand::ChartPointer {
                dimensions,
                pixel_x,
                unit,
                reply,
            } => {
                let readout = ElevationChart::new(&engine.aggregate().elevation_series, dimensions)
                    .and_then(|chart| chart.resolve_pointer(pixel_x, &engine.resolver(), unit));
                let _ = reply.send(readout);
            }
        }
    }
    tracing::info!(%id, "session closed");
}

fn history_response(engine: &EditEngine, applied: bool) -> HistoryResponse {
    HistoryResponse {
        applied,
        can_undo: engine.can_undo(),
        can_redo: engine.can_redo(),
        snapshot: engine.snapshot(),
    }
}

/// Run one intent to completion, awaiting any geometry it needs.
pub async fn apply_intent(
    engine: &mut EditEngine,
    adapter: &dyn AsyncGeometryAdapter,
    intent: EditIntent,
) -> EditOutcome {
    match engine.begin(intent) {
        Step::Done(outcome) => outcome,
        Step::Fetch(pending) => {
            let geometry = fetch_segments(adapter, pending.requests()).await;
            engine.complete(pending, geometry)
        }
    }
}

async fn fetch_segments(
    adapter: &dyn AsyncGeometryAdapter,
    requests: &[SegmentRequest],
) -> Result<Vec<Segment>, RouteError> {
    try_join_all(requests.iter().map(|request| async move {
        adapter
            .segment_geometry(request.from, request.to)
            .await
            .map_err(|source| RouteError::GeometryUnavailable {
                segment: request.segment,
                source,
            })
    }))
    .await
}
