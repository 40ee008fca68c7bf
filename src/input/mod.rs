pub mod batch;
pub mod json;
#[cfg(test)]
pub mod memory;

pub use batch::{load_race, LoadedRace, RaceRequest};
pub use json::FsAssetLoader;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::{ImageHandle, TelemetrySample, TrackPoint};

/// Errors raised while fetching race assets
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("unknown race: {0}")]
    UnknownRace(String),

    #[error("no telemetry for {car} in {race}")]
    NoTelemetry { car: String, race: String },

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("load task failed: {0}")]
    Task(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Source of track, telemetry and sprite assets.
///
/// Implementations resolve race and car ids to their stored payloads; every
/// operation may fail with [`LoadError::NotFound`] when the resource is absent.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Load the circuit outline for a race
    async fn load_track(&self, race_id: &str) -> LoadResult<Vec<TrackPoint>>;

    /// Load one car's telemetry for a race
    async fn load_telemetry(&self, car_id: &str, race_id: &str) -> LoadResult<Vec<TelemetrySample>>;

    /// Resolve a sprite
    async fn load_image(&self, path: &str) -> LoadResult<ImageHandle>;
}
