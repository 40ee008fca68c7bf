use serde::{Deserialize, Serialize};

/// One timestamped recording of a car's state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Seconds since the start of the recording
    pub time: f64,

    /// Speed in km/h
    pub speed: f64,

    /// Brake application in [0, 1], when recorded
    #[serde(default)]
    pub brake: Option<f64>,
}

#[cfg(test)]
impl TelemetrySample {
    pub fn new(time: f64, speed: f64) -> Self {
        Self {
            time,
            speed,
            brake: None,
        }
    }

    pub fn with_brake(mut self, brake: f64) -> Self {
        self.brake = Some(brake);
        self
    }
}

/// The pair of samples surrounding a playback time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub index: usize,
    pub current: TelemetrySample,
    pub next: TelemetrySample,
}

impl Bracket {
    /// Time-based blend factor between `current` and `next`
    pub fn alpha(&self, elapsed: f64) -> f64 {
        let span = self.next.time - self.current.time;
        if span > 0.0 {
            (elapsed - self.current.time) / span
        } else {
            0.0
        }
    }
}

/// Ordered telemetry samples for one car in one race
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySeries {
    samples: Vec<TelemetrySample>,
}

impl TelemetrySeries {
    pub fn new(samples: Vec<TelemetrySample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    /// Playable series have at least two samples
    pub fn is_playable(&self) -> bool {
        self.samples.len() >= 2
    }

    /// Time of the last sample
    pub fn total_time(&self) -> Option<f64> {
        self.samples.last().map(|s| s.time)
    }

    /// Whether sample times strictly increase
    pub fn is_monotonic(&self) -> bool {
        self.samples.windows(2).all(|w| w[0].time < w[1].time)
    }

    /// Find the samples surrounding `elapsed`.
    ///
    /// Returns the largest index `i <= len - 2` with `samples[i].time <= elapsed`,
    /// scanning forward from `hint`. The hint is ignored when it lies past
    /// `elapsed` (the clock went backwards) or out of range.
    pub fn bracket_from(&self, elapsed: f64, hint: usize) -> Option<Bracket> {
        if !self.is_playable() {
            return None;
        }
        let last_pair = self.samples.len() - 2;

        let mut index = if hint <= last_pair && self.samples[hint].time <= elapsed {
            hint
        } else {
            0
        };

        while index < last_pair && self.samples[index + 1].time <= elapsed {
            index += 1;
        }

        Some(Bracket {
            index,
            current: self.samples[index],
            next: self.samples[index + 1],
        })
    }
}

#[cfg(test)]
impl TelemetrySeries {
    pub fn bracket(&self, elapsed: f64) -> Option<Bracket> {
        self.bracket_from(elapsed, 0)
    }
}

impl From<Vec<TelemetrySample>> for TelemetrySeries {
    fn from(samples: Vec<TelemetrySample>) -> Self {
        Self::new(samples)
    }
}
