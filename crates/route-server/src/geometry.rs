//! Asynchronous geometry resolution for editing sessions.

use futures::future::BoxFuture;
use route_core::{Coordinate, GeometryAdapter, GeometryError, Segment};

/// Async counterpart of [`GeometryAdapter`], shared across sessions.
pub trait AsyncGeometryAdapter: Send + Sync {
    fn segment_geometry(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> BoxFuture<'_, Result<Segment, GeometryError>>;
}

/// Runs a synchronous adapter inline. Used when no elevation provider is
/// configured and in tests.
#[derive(Debug, Clone)]
pub struct InProcessAdapter<A> {
    inner: A,
}

impl<A> InProcessAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A> AsyncGeometryAdapter for InProcessAdapter<A>
where
    A: GeometryAdapter + Send + Sync,
{
    fn segment_geometry(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> BoxFuture<'_, Result<Segment, GeometryError>> {
        let result = self.inner.segment_geometry(from, to);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_core::{FlatTerrain, GreatCircleAdapter};

    #[tokio::test]
    async fn in_process_adapter_resolves_segments() {
        let adapter = InProcessAdapter::new(GreatCircleAdapter::new(FlatTerrain(12.0), 100.0, 50));
        let segment = adapter
            .segment_geometry(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01))
            .await
            .unwrap();
        assert!(segment.length_m > 1_000.0);
        assert!(segment.elevation.iter().all(|s| s.elevation_m == 12.0));
    }

    #[tokio::test]
    async fn in_process_adapter_rejects_invalid_coordinates() {
        let adapter = InProcessAdapter::new(GreatCircleAdapter::new(FlatTerrain(0.0), 100.0, 50));
        let err = adapter
            .segment_geometry(Coordinate::new(0.0, 95.0), Coordinate::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidCoordinate { .. }));
    }
}
