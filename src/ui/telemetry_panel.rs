use chrono::Duration;
use imgui::{Condition, Ui};

use crate::playback::{CarFrameState, Frame};

/// Text shown for one tick, rebuilt from scratch every frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryReadout {
    pub elapsed: String,
    pub lines: Vec<String>,
}

impl TelemetryReadout {
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            elapsed: format_elapsed(frame.elapsed),
            lines: frame.cars.iter().map(format_car_line).collect(),
        }
    }
}

/// `Elapsed: m:ss.mmm`
pub fn format_elapsed(secs: f64) -> String {
    let elapsed = Duration::milliseconds((secs.max(0.0) * 1000.0).round() as i64);
    format!(
        "Elapsed: {}:{:02}.{:03}",
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60,
        elapsed.num_milliseconds() % 1000
    )
}

pub fn format_car_line(state: &CarFrameState) -> String {
    let brake = match state.current.brake {
        Some(brake) => format!("{:.0}%", brake * 100.0),
        None => "--".to_string(),
    };
    format!(
        "Driver: {} | Speed: {} km/h | Brake: {} | Gap: {}",
        state.name, state.current.speed, brake, state.gap
    )
}

/// Window listing each running car's current sample and gap
#[derive(Default)]
pub struct TelemetryWindow {
    readout: Option<TelemetryReadout>,
}

impl TelemetryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, frame: Option<&Frame>) {
        self.readout = frame.map(TelemetryReadout::from_frame);
    }

    pub fn render(&self, ui: &Ui, opened: &mut bool) {
        ui.window("Telemetry")
            .size([420.0, 160.0], Condition::FirstUseEver)
            .position([20.0, 260.0], Condition::FirstUseEver)
            .opened(opened)
            .build(|| {
                let Some(readout) = &self.readout else {
                    ui.text_disabled("No race running");
                    return;
                };
                ui.text(&readout.elapsed);
                ui.separator();
                if readout.lines.is_empty() {
                    ui.text_disabled("No cars on track");
                }
                for line in &readout.lines {
                    ui.text(line);
                }
            });
    }
}
