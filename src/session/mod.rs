pub mod controller;

pub use controller::{LoadOutcome, LoadStatus, RaceController};

use crate::core::{Car, TrackGeometry};
use crate::input::LoadedRace;

/// The race currently being replayed
#[derive(Debug, Clone)]
pub struct RaceSession {
    pub race_id: String,
    pub track: TrackGeometry,
    pub cars: Vec<Car>,
}

impl From<LoadedRace> for RaceSession {
    fn from(race: LoadedRace) -> Self {
        Self {
            race_id: race.race_id,
            track: race.track,
            cars: race.cars,
        }
    }
}
