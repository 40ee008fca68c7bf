use std::collections::HashMap;

use crate::core::track::TrackLocation;
use crate::core::{Bracket, Car, TelemetrySample, TelemetrySeries, TrackGeometry, TrackPoint};
use crate::playback::gap::{compute_gaps, Gap};

/// Per-car visibility, updated by UI events and read once per tick
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    visible: HashMap<String, bool>,
}

impl VisibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, visible: bool) {
        self.visible.insert(name.to_string(), visible);
    }

    /// Unknown cars are hidden
    pub fn is_visible(&self, name: &str) -> bool {
        self.visible.get(name).copied().unwrap_or(false)
    }

    /// Register cars as visible, keeping any choice already made for them
    pub fn register<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.visible.entry(name.to_string()).or_insert(true);
        }
    }
}

/// Outcome of advancing one car to a playback time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarUpdate {
    /// Too little telemetry to animate
    NotReady,
    /// Playback time is past the car's last sample
    Finished,
    Running {
        bracket: Bracket,
        progress: f64,
        location: TrackLocation,
    },
}

/// Place a car on the track at `elapsed` seconds.
///
/// Position follows the fraction of the car's total recorded time that has
/// elapsed, mapped onto the track's point indices. It does not depend on the
/// speed samples. `hint` is where the bracket scan starts.
pub fn advance(track: &TrackGeometry, telemetry: &TelemetrySeries, elapsed: f64, hint: usize) -> CarUpdate {
    let total_time = match telemetry.total_time() {
        Some(total) if telemetry.is_playable() && total > 0.0 => total,
        _ => return CarUpdate::NotReady,
    };
    if elapsed > total_time {
        return CarUpdate::Finished;
    }

    let (Some(bracket), Some(location)) = (
        telemetry.bracket_from(elapsed, hint),
        track.locate(elapsed / total_time),
    ) else {
        return CarUpdate::NotReady;
    };

    CarUpdate::Running {
        bracket,
        progress: elapsed / total_time,
        location,
    }
}

/// A visible car's state for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct CarFrameState {
    pub car_index: usize,
    pub name: String,
    pub current: TelemetrySample,
    pub next: TelemetrySample,
    /// Time-based blend between `current` and `next`; not used for position
    pub sample_alpha: f64,
    pub progress: f64,
    pub position: TrackPoint,
    pub gap: Gap,
}

/// Everything drawn for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub elapsed: f64,
    pub cars: Vec<CarFrameState>,
}

#[cfg(test)]
impl Frame {
    pub fn car(&self, name: &str) -> Option<&CarFrameState> {
        self.cars.iter().find(|c| c.name == name)
    }
}

/// Computes car positions and gaps from elapsed playback time
///
/// Keeps each car's last bracket index so the telemetry scan resumes where
/// the previous tick left off.
#[derive(Debug, Default)]
pub struct PlaybackEngine {
    cursors: Vec<usize>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget carried-forward scan positions
    pub fn reset(&mut self) {
        self.cursors.clear();
    }

    /// Compute the frame at `elapsed` seconds.
    ///
    /// Hidden, unready and finished cars are left out. An empty track yields
    /// an empty frame.
    pub fn frame(&mut self, elapsed: f64, track: &TrackGeometry, cars: &[Car], visibility: &VisibilityMap) -> Frame {
        let mut frame = Frame {
            elapsed,
            cars: Vec::new(),
        };
        if track.is_empty() {
            return frame;
        }
        self.cursors.resize(cars.len(), 0);

        for (car_index, car) in cars.iter().enumerate() {
            if !visibility.is_visible(&car.name) {
                continue;
            }

            let hint = self.cursors[car_index];
            if let CarUpdate::Running {
                bracket,
                progress,
                location,
            } = advance(track, &car.telemetry, elapsed, hint)
            {
                self.cursors[car_index] = bracket.index;
                frame.cars.push(CarFrameState {
                    car_index,
                    name: car.name.clone(),
                    current: bracket.current,
                    next: bracket.next,
                    sample_alpha: bracket.alpha(elapsed),
                    progress,
                    position: location.position,
                    gap: Gap::Leader,
                });
            }
        }

        let entries: Vec<(f64, f64)> = frame
            .cars
            .iter()
            .map(|c| (c.current.time, c.progress))
            .collect();
        for (state, gap) in frame.cars.iter_mut().zip(compute_gaps(&entries)) {
            state.gap = gap;
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ImageHandle;
    use std::path::PathBuf;

    fn track() -> TrackGeometry {
        TrackGeometry::new(vec![
            TrackPoint::new(0.0, 0.0),
            TrackPoint::new(10.0, 0.0),
            TrackPoint::new(10.0, 10.0),
        ])
    }

    fn car(name: &str, times: &[f64]) -> Car {
        let samples = times
            .iter()
            .enumerate()
            .map(|(i, &t)| TelemetrySample::new(t, 50.0 * i as f64))
            .collect();
        Car::new(
            name,
            TelemetrySeries::new(samples),
            ImageHandle {
                path: PathBuf::from("car.png"),
            },
        )
    }

    fn all_visible(cars: &[Car]) -> VisibilityMap {
        let mut visibility = VisibilityMap::new();
        visibility.register(cars.iter().map(|c| c.name.as_str()));
        visibility
    }

    #[test]
    fn test_reference_scenario() {
        let telemetry = TelemetrySeries::new(vec![
            TelemetrySample::new(0.0, 0.0),
            TelemetrySample::new(2.0, 100.0),
            TelemetrySample::new(4.0, 50.0),
        ]);

        match advance(&track(), &telemetry, 1.0, 0) {
            CarUpdate::Running {
                bracket,
                progress,
                location,
            } => {
                assert_eq!(bracket.current.time, 0.0);
                assert_eq!(bracket.next.time, 2.0);
                assert_eq!(progress, 0.25);
                assert_eq!(location.lower, 0);
                assert_eq!(location.alpha, 0.5);
                assert_eq!(location.position, TrackPoint::new(5.0, 0.0));
            }
            other => panic!("expected running car, got {:?}", other),
        }
    }

    #[test]
    fn test_car_past_total_time_is_finished() {
        let telemetry = car("A", &[0.0, 2.0, 4.0]).telemetry;
        assert_eq!(advance(&track(), &telemetry, 4.0001, 0), CarUpdate::Finished);
        assert!(matches!(advance(&track(), &telemetry, 4.0, 0), CarUpdate::Running { .. }));
    }

    #[test]
    fn test_end_of_recording_lands_on_last_point() {
        let telemetry = car("A", &[0.0, 2.0, 4.0]).telemetry;
        match advance(&track(), &telemetry, 4.0, 0) {
            CarUpdate::Running { location, progress, .. } => {
                assert_eq!(progress, 1.0);
                assert_eq!(location.position, TrackPoint::new(10.0, 10.0));
            }
            other => panic!("expected running car, got {:?}", other),
        }
    }

    #[test]
    fn test_short_telemetry_is_not_ready() {
        let telemetry = car("A", &[0.0]).telemetry;
        assert_eq!(advance(&track(), &telemetry, 0.0, 0), CarUpdate::NotReady);
    }

    #[test]
    fn test_finished_car_excluded_while_other_runs() {
        let cars = vec![car("Four", &[0.0, 2.0, 4.0]), car("Five", &[0.0, 2.5, 5.0])];
        let mut engine = PlaybackEngine::new();

        let frame = engine.frame(4.5, &track(), &cars, &all_visible(&cars));
        assert_eq!(frame.cars.len(), 1);
        assert_eq!(frame.cars[0].name, "Five");
        assert!(frame.cars[0].gap.is_leader());
    }

    #[test]
    fn test_hidden_and_unknown_cars_are_skipped() {
        let cars = vec![car("Shown", &[0.0, 4.0]), car("Hidden", &[0.0, 4.0]), car("Unknown", &[0.0, 4.0])];
        let mut visibility = VisibilityMap::new();
        visibility.set("Shown", true);
        visibility.set("Hidden", false);

        let frame = PlaybackEngine::new().frame(1.0, &track(), &cars, &visibility);
        let names: Vec<_> = frame.cars.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Shown"]);
    }

    #[test]
    fn test_empty_track_renders_nothing() {
        let cars = vec![car("A", &[0.0, 4.0])];
        let frame = PlaybackEngine::new().frame(1.0, &TrackGeometry::default(), &cars, &all_visible(&cars));
        assert!(frame.cars.is_empty());
    }

    #[test]
    fn test_gaps_follow_progress_leader() {
        // The shorter recording covers more of the track at the same elapsed time.
        let cars = vec![car("Long", &[0.0, 1.0, 3.0, 8.0]), car("Short", &[0.0, 1.5, 4.0])];
        let frame = PlaybackEngine::new().frame(2.0, &track(), &cars, &all_visible(&cars));

        let short = frame.car("Short").unwrap();
        let long = frame.car("Long").unwrap();
        assert!(short.gap.is_leader());
        assert_eq!(short.current.time, 1.5);
        assert_eq!(long.current.time, 1.0);
        assert_eq!(long.gap, Gap::Delta(-0.5));
    }

    #[test]
    fn test_cursor_survives_time_going_backwards() {
        let cars = vec![car("A", &[0.0, 1.0, 2.0, 3.0, 4.0])];
        let visibility = all_visible(&cars);
        let mut engine = PlaybackEngine::new();

        let late = engine.frame(3.5, &track(), &cars, &visibility);
        assert_eq!(late.cars[0].current.time, 3.0);

        let early = engine.frame(0.5, &track(), &cars, &visibility);
        assert_eq!(early.cars[0].current.time, 0.0);
        assert_eq!(early.cars[0].next.time, 1.0);
    }

    #[test]
    fn test_sample_alpha_is_reported() {
        let cars = vec![car("A", &[0.0, 2.0, 4.0])];
        let frame = PlaybackEngine::new().frame(3.0, &track(), &cars, &all_visible(&cars));
        assert_eq!(frame.cars[0].sample_alpha, 0.5);
    }
}
