pub mod canvas;
pub mod dialogs;
pub mod race_control;
pub mod telemetry_panel;

pub use canvas::{ImguiCanvas, Renderer};
pub use dialogs::FileDialogs;
pub use race_control::{RaceControlAction, RaceControlWindow};
pub use telemetry_panel::TelemetryWindow;
