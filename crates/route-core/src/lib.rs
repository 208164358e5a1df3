//! Route editing core: waypoints and segments, incremental aggregation,
//! the drag/commit state machine and chart/map cursor resolution.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod history;
pub mod models;
pub mod resolver;
pub mod spatial;
pub mod store;
pub mod units;

pub use aggregate::{RouteAggregate, RouteAggregator};
pub use chart::{ChartDimensions, CursorReadout, ElevationChart, LinearScale, ProfilePath};
pub use config::EditorConfig;
pub use engine::{EditEngine, EditOutcome, EditState, IgnoredIntent, PendingCommit, Step};
pub use error::{GeometryError, RouteEditFailed, RouteError};
pub use geometry::{ElevationSource, FlatTerrain, GeometryAdapter, GreatCircleAdapter};
pub use models::{BoundingBox, Coordinate, EditIntent, ElevationSample, RouteSnapshot, Segment};
pub use resolver::{search_screen_x, ArcLengthPath, PathHit, PositionResolver, ScreenPoint};
pub use spatial::{distance_between, NearestPoint};
pub use store::{SegmentRequest, SegmentStore};
pub use units::DistanceUnit;
