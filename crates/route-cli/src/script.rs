//! Intent scripts: a JSON array of edit intents applied in order.

use anyhow::{Context, Result};
use route_core::{
    Coordinate, DistanceUnit, EditEngine, EditIntent, EditOutcome, EditorConfig, FlatTerrain,
    GreatCircleAdapter, RouteEditFailed, RouteSnapshot,
};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Distances (in the display unit) to resolve to map coordinates
    pub cursors: Vec<f64>,
    pub markers: bool,
    /// Constant terrain height for generated segments
    pub elevation_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CursorPoint {
    pub distance: f64,
    pub label: String,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub units: DistanceUnit,
    pub total_distance: f64,
    pub outcomes: Vec<EditOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cursors: Vec<CursorPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<Coordinate>>,
    pub snapshot: RouteSnapshot,
    #[serde(skip)]
    pub notifications: Vec<RouteEditFailed>,
}

pub fn parse_script(raw: &str) -> Result<Vec<EditIntent>> {
    serde_json::from_str(raw).context("script must be a JSON array of edit intents")
}

pub fn load_script(path: &Path) -> Result<Vec<EditIntent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&raw)
}

/// Apply every intent with great-circle geometry over flat terrain.
pub fn replay(
    intents: &[EditIntent],
    config: &EditorConfig,
    options: &ReplayOptions,
) -> ReplayReport {
    let adapter = GreatCircleAdapter::from_config(FlatTerrain(options.elevation_m), config);
    let mut engine = EditEngine::new(config);

    let outcomes: Vec<EditOutcome> = intents
        .iter()
        .map(|intent| engine.apply(*intent, &adapter))
        .collect();
    tracing::debug!(intents = intents.len(), "script replayed");

    let units = config.default_units;
    let resolver = engine.resolver();
    let cursors = options
        .cursors
        .iter()
        .map(|&distance| {
            let meters = units.to_meters(distance);
            CursorPoint {
                distance,
                label: units.format_distance(meters),
                coordinate: resolver.distance_to_coordinate(meters),
            }
        })
        .collect();
    let markers = options
        .markers
        .then(|| resolver.distance_markers(units));

    ReplayReport {
        units,
        total_distance: engine.aggregate().total_distance(units),
        outcomes,
        cursors,
        markers,
        snapshot: engine.snapshot(),
        notifications: engine.take_notifications(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"[
        {"type": "append", "coord": [0.0, 0.0]},
        {"type": "append", "coord": [0.0, 0.01]},
        {"type": "append", "coord": [0.01, 0.01]},
        {"type": "drag_start", "index": 1},
        {"type": "drag_move", "index": 1, "coord": [0.002, 0.008]},
        {"type": "drag_end", "index": 1, "coord": [0.003, 0.007]},
        {"type": "drag_end", "index": 9, "coord": [1.0, 1.0]}
    ]"#;

    fn km_config() -> EditorConfig {
        EditorConfig {
            default_units: DistanceUnit::Kilometers,
            sample_spacing_m: 100.0,
            ..EditorConfig::default()
        }
    }

    #[test]
    fn replays_script_in_order() {
        let intents = parse_script(SCRIPT).unwrap();
        assert_eq!(intents.len(), 7);

        let report = replay(&intents, &km_config(), &ReplayOptions::default());
        assert_eq!(report.snapshot.waypoints.len(), 3);
        assert_eq!(report.snapshot.waypoints[1], Coordinate::new(0.003, 0.007));
        assert_eq!(report.snapshot.segment_count, 2);
        assert_eq!(report.outcomes[4], EditOutcome::Previewed);
        assert_eq!(
            report.outcomes[5],
            EditOutcome::Committed {
                changed_segments: vec![0, 1]
            }
        );
        assert!(matches!(report.outcomes[6], EditOutcome::Ignored { .. }));
        assert!(report.notifications.is_empty());
        assert!(report.markers.is_none());
    }

    #[test]
    fn resolves_cursors_and_markers_in_display_units() {
        let intents = parse_script(
            r#"[{"type": "append", "coord": [0.0, 0.0]}, {"type": "append", "coord": [0.0, 0.03]}]"#,
        )
        .unwrap();
        let options = ReplayOptions {
            cursors: vec![1.5, 0.0],
            markers: true,
            elevation_m: 0.0,
        };
        let report = replay(&intents, &km_config(), &options);

        assert!((report.total_distance - 3.3358).abs() < 0.01);
        assert_eq!(report.cursors[0].label, "1.50 km");
        assert!(report.cursors[0].coordinate.is_some());
        assert!(report.cursors[1].coordinate.is_none());
        assert_eq!(report.markers.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn failed_edits_surface_notifications() {
        let intents = parse_script(
            r#"[{"type": "append", "coord": [0.0, 0.0]}, {"type": "append", "coord": [0.0, 91.0]}]"#,
        )
        .unwrap();
        let report = replay(&intents, &km_config(), &ReplayOptions::default());
        assert_eq!(report.notifications.len(), 1);
        assert_eq!(report.snapshot.waypoints.len(), 1);
        assert_eq!(report.snapshot.segment_count, 0);
    }

    #[test]
    fn rejects_malformed_scripts() {
        assert!(parse_script(r#"{"type": "append"}"#).is_err());
        assert!(parse_script(r#"[{"type": "teleport"}]"#).is_err());
    }
}
