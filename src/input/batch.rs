use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{AssetLoader, LoadError, LoadResult};
use crate::config::RaceCatalog;
use crate::core::{Car, TelemetrySeries, TrackGeometry};

/// One car's assets to fetch
#[derive(Debug, Clone, PartialEq)]
pub struct CarRequest {
    pub name: String,
    pub image: String,
    pub color: [f32; 4],
}

/// Everything needed to load one race
#[derive(Debug, Clone, PartialEq)]
pub struct RaceRequest {
    pub race_id: String,
    pub cars: Vec<CarRequest>,
}

impl RaceRequest {
    /// Build the request for a race from the catalog's car list
    pub fn from_catalog(catalog: &RaceCatalog, race_id: &str) -> LoadResult<Self> {
        if catalog.race(race_id).is_none() {
            return Err(LoadError::UnknownRace(race_id.to_string()));
        }

        let cars = catalog
            .cars_in(race_id)
            .map(|car| CarRequest {
                name: car.name.clone(),
                image: car.image.clone(),
                color: car.color,
            })
            .collect();

        Ok(Self {
            race_id: race_id.to_string(),
            cars,
        })
    }
}

/// Assets of a fully loaded race
#[derive(Debug, Clone)]
pub struct LoadedRace {
    pub race_id: String,
    pub track: TrackGeometry,
    pub cars: Vec<Car>,
}

/// Load a race's track, then every car's telemetry and sprite in parallel.
///
/// The first failure aborts the whole batch; dropping the returned future
/// cancels any per-car loads still in flight. Cars come back in request order.
pub async fn load_race(loader: Arc<dyn AssetLoader>, request: RaceRequest) -> LoadResult<LoadedRace> {
    info!("Loading race {} ({} cars)", request.race_id, request.cars.len());

    let track = loader.load_track(&request.race_id).await?;
    debug!("Track {} has {} points", request.race_id, track.len());

    let car_count = request.cars.len();
    let mut tasks = JoinSet::new();
    for (index, car) in request.cars.into_iter().enumerate() {
        let loader = loader.clone();
        let race_id = request.race_id.clone();
        tasks.spawn(async move {
            let (image, samples) = tokio::try_join!(
                loader.load_image(&car.image),
                loader.load_telemetry(&car.name, &race_id)
            )?;
            let car = Car::new(car.name, TelemetrySeries::new(samples), image).with_color(car.color);
            Ok::<_, LoadError>((index, car))
        });
    }

    let mut cars = Vec::with_capacity(car_count);
    while let Some(joined) = tasks.join_next().await {
        let (index, car) = joined.map_err(|e| LoadError::Task(e.to_string()))??;
        if !car.telemetry.is_monotonic() {
            warn!("Telemetry for {} is not strictly increasing in time", car.name);
        }
        debug!("Loaded {} samples for {}", car.telemetry.samples().len(), car.name);
        cars.push((index, car));
    }
    cars.sort_by_key(|(index, _)| *index);

    Ok(LoadedRace {
        race_id: request.race_id,
        track: TrackGeometry::new(track),
        cars: cars.into_iter().map(|(_, car)| car).collect(),
    })
}
