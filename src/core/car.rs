use std::path::PathBuf;

use super::TelemetrySeries;

/// Handle to a car sprite.
///
/// Sprites are not decoded; the renderer paints a rectangle in the car's
/// livery colour at the sprite's size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    pub path: PathBuf,
}

/// A car taking part in the loaded race
#[derive(Debug, Clone)]
pub struct Car {
    pub name: String,
    pub telemetry: TelemetrySeries,
    pub image: ImageHandle,
    pub color: [f32; 4],
}

impl Car {
    pub fn new(name: impl Into<String>, telemetry: TelemetrySeries, image: ImageHandle) -> Self {
        Self {
            name: name.into(),
            telemetry,
            image,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}
