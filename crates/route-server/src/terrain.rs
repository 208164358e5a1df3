//! Segment geometry sampled against a remote elevation provider.
//!
//! Segments are straight great-circle lines densified at the configured
//! spacing. Elevations come from an Open-Meteo compatible endpoint, fetched
//! in chunks and cached per coordinate.

use crate::cache::{prune_cache, CacheEntry};
use crate::config::Config;
use crate::geometry::AsyncGeometryAdapter;
use dashmap::DashMap;
use futures::future::BoxFuture;
use reqwest::Client;
use route_core::geometry::{segment_from_samples, validate};
use route_core::spatial::densify_great_circle;
use route_core::{Coordinate, GeometryError, Segment};
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct ElevationCacheEntry {
    fetched_at: Instant,
    elevation_m: f64,
}

impl CacheEntry for ElevationCacheEntry {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoElevationResponse {
    elevation: Option<Vec<f64>>,
}

pub struct TerrainGeometryAdapter {
    client: Client,
    provider_url: String,
    timeout: Duration,
    max_points_per_request: usize,
    cache_ttl: Duration,
    cache_max_entries: usize,
    sample_spacing_m: f64,
    max_samples: usize,
    cache: DashMap<String, ElevationCacheEntry>,
}

impl TerrainGeometryAdapter {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            provider_url: config.elevation_provider_url.trim().to_string(),
            timeout: Duration::from_secs(config.elevation_timeout_s.max(1)),
            max_points_per_request: config.elevation_max_points_per_request.max(1),
            cache_ttl: Duration::from_secs(config.elevation_cache_ttl_s.max(30)),
            cache_max_entries: config.elevation_cache_max_entries.max(1),
            sample_spacing_m: config.editor.sample_spacing_m,
            max_samples: config.editor.max_samples_per_segment,
            cache: DashMap::new(),
        }
    }

    async fn resolve(&self, from: Coordinate, to: Coordinate) -> Result<Segment, GeometryError> {
        validate(from)?;
        validate(to)?;

        let coordinates = densify_great_circle(from, to, self.sample_spacing_m, self.max_samples);
        let elevations = self.elevations(&coordinates).await?;
        Ok(segment_from_samples(coordinates, &elevations))
    }

    async fn elevations(&self, coordinates: &[Coordinate]) -> Result<Vec<f64>, GeometryError> {
        let mut elevations = vec![0.0; coordinates.len()];
        let mut stale: Vec<Option<f64>> = vec![None; coordinates.len()];
        let mut missing = Vec::new();

        for (idx, coord) in coordinates.iter().enumerate() {
            match self.cache.get(&cache_key(*coord)) {
                Some(entry) => {
                    let age = entry.fetched_at.elapsed();
                    if age <= self.cache_ttl {
                        elevations[idx] = entry.elevation_m;
                        continue;
                    }
                    if age <= self.cache_ttl.saturating_mul(2) {
                        stale[idx] = Some(entry.elevation_m);
                    }
                    missing.push(idx);
                }
                None => missing.push(idx),
            }
        }

        if missing.is_empty() {
            return Ok(elevations);
        }

        for chunk in missing.chunks(self.max_points_per_request) {
            let points: Vec<Coordinate> = chunk.iter().map(|&idx| coordinates[idx]).collect();
            match self.fetch_chunk(&points).await {
                Ok(values) => {
                    let now = Instant::now();
                    for (&idx, value) in chunk.iter().zip(values) {
                        elevations[idx] = value;
                        self.cache.insert(
                            cache_key(coordinates[idx]),
                            ElevationCacheEntry {
                                fetched_at: now,
                                elevation_m: value,
                            },
                        );
                    }
                }
                Err(err) => {
                    let fallback: Option<Vec<f64>> = chunk.iter().map(|&idx| stale[idx]).collect();
                    match fallback {
                        Some(values) => {
                            tracing::warn!("Elevation fetch failed, using stale cache: {}", err);
                            for (&idx, value) in chunk.iter().zip(values) {
                                elevations[idx] = value;
                            }
                        }
                        None => {
                            tracing::warn!(points = points.len(), "Elevation fetch failed: {}", err);
                            return Err(GeometryError::Unavailable(err));
                        }
                    }
                }
            }
        }

        prune_cache(&self.cache, self.cache_max_entries, self.cache_ttl.saturating_mul(2));
        Ok(elevations)
    }

    async fn fetch_chunk(&self, points: &[Coordinate]) -> Result<Vec<f64>, String> {
        if self.provider_url.is_empty() {
            return Err("elevation provider URL is empty".to_string());
        }

        let latitudes: Vec<f64> = points.iter().map(|p| p.lat).collect();
        let longitudes: Vec<f64> = points.iter().map(|p| p.lon).collect();
        let url = build_provider_url(
            &self.provider_url,
            &join_params(&latitudes),
            &join_params(&longitudes),
        );

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            return Err(format!("elevation provider HTTP {}", response.status()));
        }

        let payload: OpenMeteoElevationResponse =
            response.json().await.map_err(|err| err.to_string())?;
        let values = payload
            .elevation
            .ok_or_else(|| "elevation provider missing elevation".to_string())?;

        if values.len() != points.len() {
            return Err("elevation provider returned unexpected sample count".to_string());
        }

        Ok(values
            .into_iter()
            .map(|value| if value.is_finite() { value } else { 0.0 })
            .collect())
    }
}

impl AsyncGeometryAdapter for TerrainGeometryAdapter {
    fn segment_geometry(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> BoxFuture<'_, Result<Segment, GeometryError>> {
        Box::pin(self.resolve(from, to))
    }
}

fn join_params(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| format!("{:.6}", value))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_provider_url(base: &str, latitudes: &str, longitudes: &str) -> String {
    let separator = if base.contains('?') { "&" } else { "?" };
    format!(
        "{}{}latitude={}&longitude={}",
        base, separator, latitudes, longitudes
    )
}

fn cache_key(coord: Coordinate) -> String {
    format!("{:.6}:{:.6}", coord.lat, coord.lon)
}
