use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use super::{AssetLoader, LoadError, LoadResult};
use crate::config::RaceCatalog;
use crate::core::{ImageHandle, TelemetrySample, TrackPoint};

/// Loads race assets stored as JSON files under a root directory
///
/// Track files hold an array of `{x, y}` objects, telemetry files an array
/// of `{time, speed, brake?}` objects. File names come from the catalog.
pub struct FsAssetLoader {
    root: PathBuf,
    catalog: RaceCatalog,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>, catalog: RaceCatalog) -> Self {
        Self {
            root: root.into(),
            catalog,
        }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    async fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> LoadResult<T> {
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                LoadError::NotFound(path.display().to_string())
            } else {
                LoadError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        debug!("Read {} bytes from {:?}", bytes.len(), path);

        serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse { path, source })
    }
}

#[async_trait]
impl AssetLoader for FsAssetLoader {
    async fn load_track(&self, race_id: &str) -> LoadResult<Vec<TrackPoint>> {
        let race = self
            .catalog
            .race(race_id)
            .ok_or_else(|| LoadError::UnknownRace(race_id.to_string()))?;
        self.read_json(self.resolve(&race.track)).await
    }

    async fn load_telemetry(&self, car_id: &str, race_id: &str) -> LoadResult<Vec<TelemetrySample>> {
        let file = self
            .catalog
            .telemetry_file(car_id, race_id)
            .ok_or_else(|| LoadError::NoTelemetry {
                car: car_id.to_string(),
                race: race_id.to_string(),
            })?;
        self.read_json(self.resolve(file)).await
    }

    async fn load_image(&self, path: &str) -> LoadResult<ImageHandle> {
        let path = self.resolve(path);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(ImageHandle { path }),
            Ok(_) => Err(LoadError::NotFound(path.display().to_string())),
            Err(source) if source.kind() == ErrorKind::NotFound => {
                Err(LoadError::NotFound(path.display().to_string()))
            }
            Err(source) => Err(LoadError::Io { path, source }),
        }
    }
}
