use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::RaceSession;
use crate::config::RaceCatalog;
use crate::input::{load_race, AssetLoader, LoadResult, LoadedRace, RaceRequest};
use crate::playback::{AnimationClock, Frame, PlaybackEngine, PlaybackState, TickToken, VisibilityMap};

/// Where the active race selection stands
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    NoSelection,
    Loading(String),
    Ready(String),
    Failed(String),
}

/// Result of a finished load, reported once
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { race_id: String, cars: usize },
    Failed { race_id: String, error: String },
}

type LoadMessage = (u64, String, LoadResult<LoadedRace>);

struct PendingLoad {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the active race session and drives its animation loop
///
/// Race switches are tagged with a generation; a load that completes after
/// a newer selection was made is dropped.
pub struct RaceController {
    catalog: RaceCatalog,
    loader: Arc<dyn AssetLoader>,
    runtime: Handle,
    session: Option<RaceSession>,
    clock: AnimationClock,
    token: Option<TickToken>,
    engine: PlaybackEngine,
    visibility: VisibilityMap,
    generation: u64,
    pending: Option<PendingLoad>,
    results_tx: Sender<LoadMessage>,
    results_rx: Receiver<LoadMessage>,
    status: LoadStatus,
}

impl RaceController {
    pub fn new(catalog: RaceCatalog, loader: Arc<dyn AssetLoader>, runtime: Handle) -> Self {
        let (results_tx, results_rx) = channel();
        let mut visibility = VisibilityMap::new();
        visibility.register(catalog.cars.iter().map(|c| c.name.as_str()));
        Self {
            catalog,
            loader,
            runtime,
            session: None,
            clock: AnimationClock::new(),
            token: None,
            engine: PlaybackEngine::new(),
            visibility,
            generation: 0,
            pending: None,
            results_tx,
            results_rx,
            status: LoadStatus::NoSelection,
        }
    }

    pub fn catalog(&self) -> &RaceCatalog {
        &self.catalog
    }

    pub fn session(&self) -> Option<&RaceSession> {
        self.session.as_ref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    pub fn set_visible(&mut self, car: &str, visible: bool) {
        self.visibility.set(car, visible);
    }

    /// Swap in a new catalog and loader, dropping the current session
    pub fn replace_catalog(&mut self, catalog: RaceCatalog, loader: Arc<dyn AssetLoader>) {
        self.teardown();
        self.visibility
            .register(catalog.cars.iter().map(|c| c.name.as_str()));
        self.catalog = catalog;
        self.loader = loader;
        self.status = LoadStatus::NoSelection;
    }

    /// Cancel the animation loop. No-op when nothing is running.
    pub fn cancel(&mut self) {
        self.clock.cancel();
        self.token = None;
    }

    /// Replay the loaded race from zero without reloading assets
    pub fn restart(&mut self) {
        if self.session.is_none() {
            debug!("Restart ignored: no race loaded");
            return;
        }
        self.engine.reset();
        self.token = Some(self.clock.restart());
        info!("Lap restarted");
    }

    /// Tear down the current session and start loading `race_id`.
    ///
    /// The animation resumes once the new assets have arrived through
    /// [`poll_loads`](Self::poll_loads).
    pub fn switch_race(&mut self, race_id: &str) {
        self.teardown();
        self.generation += 1;

        let request = match RaceRequest::from_catalog(&self.catalog, race_id) {
            Ok(request) => request,
            Err(e) => {
                error!("Cannot load {}: {}", race_id, e);
                self.status = LoadStatus::Failed(e.to_string());
                return;
            }
        };

        info!("Switching to {} (generation {})", race_id, self.generation);
        let generation = self.generation;
        let loader = self.loader.clone();
        let tx = self.results_tx.clone();
        let race = race_id.to_string();
        let handle = self.runtime.spawn(async move {
            let result = load_race(loader, request).await;
            let _ = tx.send((generation, race, result));
        });

        self.pending = Some(PendingLoad { generation, handle });
        self.status = LoadStatus::Loading(race_id.to_string());
    }

    /// Apply finished loads. Call once per frame.
    pub fn poll_loads(&mut self) -> Option<LoadOutcome> {
        let mut outcome = None;
        while let Ok((generation, race_id, result)) = self.results_rx.try_recv() {
            if generation != self.generation {
                debug!("Discarding stale load of {} (generation {})", race_id, generation);
                continue;
            }
            self.pending = None;
            outcome = Some(self.finish_load(race_id, result));
        }
        outcome
    }

    /// Advance the animation to `now` and compute the frame to draw
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        let token = self.token?;
        let session = self.session.as_ref()?;
        let elapsed = self.clock.tick(token, now)?;
        Some(
            self.engine
                .frame(elapsed, &session.track, &session.cars, &self.visibility),
        )
    }

    fn finish_load(&mut self, race_id: String, result: LoadResult<LoadedRace>) -> LoadOutcome {
        let race = match result {
            Ok(race) => race,
            Err(e) => {
                error!("Failed to load {}: {}", race_id, e);
                self.status = LoadStatus::Failed(e.to_string());
                return LoadOutcome::Failed {
                    race_id,
                    error: e.to_string(),
                };
            }
        };

        if race.track.is_empty() {
            error!("No track data loaded for {}, cannot animate", race_id);
            let error = "track is empty".to_string();
            self.status = LoadStatus::Failed(error.clone());
            return LoadOutcome::Failed { race_id, error };
        }

        for car in race.cars.iter().filter(|c| !c.telemetry.is_playable()) {
            warn!("{} has fewer than two telemetry samples and will not be shown", car.name);
        }

        let cars = race.cars.len();
        self.visibility
            .register(race.cars.iter().map(|c| c.name.as_str()));
        self.session = Some(RaceSession::from(race));
        self.engine.reset();
        self.token = Some(self.clock.start());
        self.status = LoadStatus::Ready(race_id.clone());
        info!("Race {} ready with {} cars", race_id, cars);

        LoadOutcome::Loaded { race_id, cars }
    }

    fn teardown(&mut self) {
        self.cancel();
        if let Some(pending) = self.pending.take() {
            debug!("Aborting in-flight load (generation {})", pending.generation);
            pending.handle.abort();
        }
        self.session = None;
        self.engine.reset();
    }
}
