//! Route session endpoints.
//!
//! A session holds one route being edited. Intents, undo/redo and cursor
//! queries all go through the session's queue.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use route_core::{
    ChartDimensions, Coordinate, CursorReadout, DistanceUnit, EditIntent, EditOutcome,
    RouteSnapshot,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::session::{HistoryResponse, IntentResponse, SessionHandle};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateRouteResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CursorQuery {
    /// Distance along the route, in `units` when given, otherwise meters
    pub distance: f64,
    pub units: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CursorResponse {
    pub distance_m: f64,
    pub coordinate: Option<Coordinate>,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub distance_m: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UnitsQuery {
    pub units: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkersResponse {
    pub units: DistanceUnit,
    pub markers: Vec<Coordinate>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Pointer x relative to the plotted area
    pub x: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub units: Option<String>,
}

/// Start a new, empty route.
pub async fn create_route(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreateRouteResponse>) {
    let session = state.create_session();
    tracing::info!("Created route session {}", session.id());
    (
        StatusCode::CREATED,
        Json(CreateRouteResponse {
            id: session.id(),
            created_at: session.created_at(),
        }),
    )
}

pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouteSnapshot>, StatusCode> {
    let session = find_session(&state, &id)?;
    session.snapshot().await.map(Json).map_err(closed)
}

pub async fn delete_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.remove_session(&id) {
        tracing::info!("Deleted route session {}", id);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Apply an edit intent. Rolled-back edits answer 422 with the notification
/// and the unchanged route in the body.
pub async fn submit_intent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(intent): Json<EditIntent>,
) -> Result<(StatusCode, Json<IntentResponse>), StatusCode> {
    let session = find_session(&state, &id)?;
    let response = session.apply(intent).await.map_err(closed)?;
    let status = match response.outcome {
        EditOutcome::Failed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    };
    Ok((status, Json(response)))
}

pub async fn undo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, StatusCode> {
    let session = find_session(&state, &id)?;
    session.undo().await.map(Json).map_err(closed)
}

pub async fn redo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, StatusCode> {
    let session = find_session(&state, &id)?;
    session.redo().await.map(Json).map_err(closed)
}

/// Map cursor for a distance along the route.
pub async fn cursor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<CursorQuery>,
) -> Result<Json<CursorResponse>, StatusCode> {
    let session = find_session(&state, &id)?;
    let (distance_m, unit) = match query.units.as_deref() {
        Some(raw) => {
            let unit = parse_units(raw)?;
            (unit.to_meters(query.distance), unit)
        }
        None => (query.distance, state.config().editor.default_units),
    };
    let coordinate = session.cursor(distance_m).await.map_err(closed)?;
    Ok(Json(CursorResponse {
        distance_m,
        coordinate,
        label: unit.format_distance(distance_m),
    }))
}

/// Distance along the route of the point nearest to a map position.
pub async fn nearest(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<NearestResponse>, StatusCode> {
    let session = find_session(&state, &id)?;
    let distance_m = session
        .nearest(Coordinate::new(query.lon, query.lat))
        .await
        .map_err(closed)?;
    Ok(Json(NearestResponse { distance_m }))
}

pub async fn markers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<UnitsQuery>,
) -> Result<Json<MarkersResponse>, StatusCode> {
    let session = find_session(&state, &id)?;
    let units = resolve_units(&state, query.units.as_deref())?;
    let markers = session.markers(units).await.map_err(closed)?;
    Ok(Json(MarkersResponse { units, markers }))
}

/// Readout for a pointer over the elevation chart.
pub async fn chart_pointer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Option<CursorReadout>>, StatusCode> {
    let session = find_session(&state, &id)?;
    let units = resolve_units(&state, query.units.as_deref())?;
    let defaults = ChartDimensions::default();
    let dimensions = ChartDimensions::new(
        query.width.unwrap_or(defaults.width),
        query.height.unwrap_or(defaults.height),
    );
    session
        .chart_pointer(dimensions, query.x, units)
        .await
        .map(Json)
        .map_err(closed)
}

fn find_session(state: &AppState, id: &Uuid) -> Result<SessionHandle, StatusCode> {
    state.session(id).ok_or(StatusCode::NOT_FOUND)
}

fn resolve_units(state: &AppState, raw: Option<&str>) -> Result<DistanceUnit, StatusCode> {
    match raw {
        Some(raw) => parse_units(raw),
        None => Ok(state.config().editor.default_units),
    }
}

fn parse_units(raw: &str) -> Result<DistanceUnit, StatusCode> {
    DistanceUnit::parse(raw).ok_or(StatusCode::BAD_REQUEST)
}

fn closed(err: crate::session::SessionError) -> StatusCode {
    tracing::warn!("{}", err);
    StatusCode::NOT_FOUND
}
