use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::{AssetLoader, LoadError, LoadResult};
use crate::core::{ImageHandle, TelemetrySample, TrackPoint};

/// In-memory assets for tests, with an optional per-race delay
#[derive(Default, Clone)]
pub struct MemoryAssetLoader {
    tracks: HashMap<String, Vec<TrackPoint>>,
    telemetry: HashMap<(String, String), Vec<TelemetrySample>>,
    images: Vec<String>,
    delays: HashMap<String, Duration>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, race: &str, points: Vec<TrackPoint>) -> Self {
        self.tracks.insert(race.to_string(), points);
        self
    }

    pub fn with_telemetry(mut self, car: &str, race: &str, samples: Vec<TelemetrySample>) -> Self {
        self.telemetry.insert((car.to_string(), race.to_string()), samples);
        self
    }

    pub fn with_image(mut self, path: &str) -> Self {
        self.images.push(path.to_string());
        self
    }

    pub fn with_delay(mut self, race: &str, delay: Duration) -> Self {
        self.delays.insert(race.to_string(), delay);
        self
    }
}

#[async_trait]
impl AssetLoader for MemoryAssetLoader {
    async fn load_track(&self, race_id: &str) -> LoadResult<Vec<TrackPoint>> {
        if let Some(delay) = self.delays.get(race_id) {
            tokio::time::sleep(*delay).await;
        }
        self.tracks
            .get(race_id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(race_id.to_string()))
    }

    async fn load_telemetry(&self, car_id: &str, race_id: &str) -> LoadResult<Vec<TelemetrySample>> {
        self.telemetry
            .get(&(car_id.to_string(), race_id.to_string()))
            .cloned()
            .ok_or_else(|| LoadError::NotFound(format!("{}/{}", car_id, race_id)))
    }

    async fn load_image(&self, path: &str) -> LoadResult<ImageHandle> {
        if self.images.iter().any(|p| p == path) {
            Ok(ImageHandle {
                path: PathBuf::from(path),
            })
        } else {
            Err(LoadError::NotFound(path.to_string()))
        }
    }
}
