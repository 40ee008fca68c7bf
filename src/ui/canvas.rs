use imgui::Ui;
use tracing::trace;

use crate::config::RenderConfig;
use crate::core::{Car, ImageHandle, TrackGeometry};
use crate::playback::Frame;

/// 2D drawing primitives the renderer paints with
pub trait DrawSurface {
    /// Fill the whole surface
    fn clear(&mut self, color: [f32; 4]);

    fn draw_polyline(&mut self, points: &[[f32; 2]], color: [f32; 4], thickness: f32);

    /// Draw a sprite with its top-left corner at `(x, y)`
    fn draw_sprite(&mut self, image: &ImageHandle, color: [f32; 4], x: f32, y: f32, w: f32, h: f32);
}

/// Paints the track outline and car markers for a frame
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Canvas size needed to show the whole track
    pub fn canvas_extent(&self, track: &TrackGeometry) -> [f32; 2] {
        track.points().iter().fold([0.0f32, 0.0f32], |[w, h], p| {
            [
                w.max(p.x as f32 * self.config.scale + self.config.car_width),
                h.max(p.y as f32 * self.config.scale + self.config.car_height),
            ]
        })
    }

    /// Clear the surface, then draw the track and every car in `frame`.
    ///
    /// Nothing but the background is drawn for an empty track.
    pub fn paint(&self, surface: &mut dyn DrawSurface, track: &TrackGeometry, cars: &[Car], frame: Option<&Frame>) {
        surface.clear(self.config.background);
        if track.is_empty() {
            trace!("Skipping paint: no track");
            return;
        }

        let scale = self.config.scale;
        let outline: Vec<[f32; 2]> = track
            .points()
            .iter()
            .map(|p| [p.x as f32 * scale, p.y as f32 * scale])
            .collect();
        surface.draw_polyline(&outline, self.config.track_color, self.config.track_thickness);

        let Some(frame) = frame else {
            return;
        };
        for state in &frame.cars {
            let Some(car) = cars.get(state.car_index) else {
                continue;
            };
            let w = self.config.car_width;
            let h = self.config.car_height;
            let x = state.position.x as f32 * scale - w / 2.0;
            let y = state.position.y as f32 * scale - h / 2.0;
            surface.draw_sprite(&car.image, car.color, x, y, w, h);
        }
    }
}

/// Draws onto the current imgui window, offset to the cursor position
pub struct ImguiCanvas<'ui> {
    ui: &'ui Ui,
    origin: [f32; 2],
    size: [f32; 2],
}

impl<'ui> ImguiCanvas<'ui> {
    /// Reserve `size` pixels at the cursor for drawing
    pub fn new(ui: &'ui Ui, size: [f32; 2]) -> Self {
        let origin = ui.cursor_screen_pos();
        Self { ui, origin, size }
    }

    fn at(&self, x: f32, y: f32) -> [f32; 2] {
        [self.origin[0] + x, self.origin[1] + y]
    }

    /// Advance the layout cursor past the canvas
    pub fn finish(self) {
        self.ui.dummy(self.size);
    }
}

impl DrawSurface for ImguiCanvas<'_> {
    fn clear(&mut self, color: [f32; 4]) {
        let draw_list = self.ui.get_window_draw_list();
        draw_list
            .add_rect(self.origin, self.at(self.size[0], self.size[1]), color)
            .filled(true)
            .build();
    }

    fn draw_polyline(&mut self, points: &[[f32; 2]], color: [f32; 4], thickness: f32) {
        let points: Vec<[f32; 2]> = points.iter().map(|p| self.at(p[0], p[1])).collect();
        let draw_list = self.ui.get_window_draw_list();
        draw_list.add_polyline(points, color).thickness(thickness).build();
    }

    fn draw_sprite(&mut self, _image: &ImageHandle, color: [f32; 4], x: f32, y: f32, w: f32, h: f32) {
        let draw_list = self.ui.get_window_draw_list();
        draw_list
            .add_rect(self.at(x, y), self.at(x + w, y + h), color)
            .filled(true)
            .rounding(3.0)
            .build();
        draw_list
            .add_rect(self.at(x, y), self.at(x + w, y + h), [0.0, 0.0, 0.0, 0.8])
            .rounding(3.0)
            .build();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TelemetrySample, TelemetrySeries, TrackPoint};
    use crate::playback::{PlaybackEngine, VisibilityMap};
    use std::path::PathBuf;

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear,
        Polyline(Vec<[f32; 2]>),
        Sprite(PathBuf, [f32; 4]),
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl DrawSurface for RecordingSurface {
        fn clear(&mut self, _color: [f32; 4]) {
            self.ops.push(Op::Clear);
        }

        fn draw_polyline(&mut self, points: &[[f32; 2]], _color: [f32; 4], _thickness: f32) {
            self.ops.push(Op::Polyline(points.to_vec()));
        }

        fn draw_sprite(&mut self, image: &ImageHandle, _color: [f32; 4], x: f32, y: f32, w: f32, h: f32) {
            self.ops.push(Op::Sprite(image.path.clone(), [x, y, w, h]));
        }
    }

    fn track() -> TrackGeometry {
        TrackGeometry::new(vec![
            TrackPoint::new(0.0, 0.0),
            TrackPoint::new(10.0, 0.0),
            TrackPoint::new(10.0, 10.0),
        ])
    }

    fn cars() -> Vec<Car> {
        vec![Car::new(
            "Leclerc",
            TelemetrySeries::new(vec![
                TelemetrySample::new(0.0, 0.0),
                TelemetrySample::new(2.0, 100.0),
                TelemetrySample::new(4.0, 50.0),
            ]),
            ImageHandle {
                path: PathBuf::from("FerrariCar.png"),
            },
        )]
    }

    #[test]
    fn test_paint_centres_sprite_on_position() {
        let cars = cars();
        let mut visibility = VisibilityMap::new();
        visibility.set("Leclerc", true);
        let frame = PlaybackEngine::new().frame(1.0, &track(), &cars, &visibility);

        let mut surface = RecordingSurface::default();
        Renderer::new(RenderConfig::default()).paint(&mut surface, &track(), &cars, Some(&frame));

        assert_eq!(
            surface.ops,
            vec![
                Op::Clear,
                Op::Polyline(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]),
                Op::Sprite(PathBuf::from("FerrariCar.png"), [-10.0, -7.5, 30.0, 15.0]),
            ]
        );
    }

    #[test]
    fn test_empty_track_only_clears() {
        let mut surface = RecordingSurface::default();
        Renderer::new(RenderConfig::default()).paint(
            &mut surface,
            &TrackGeometry::default(),
            &cars(),
            Some(&Frame::default()),
        );
        assert_eq!(surface.ops, vec![Op::Clear]);
    }

    #[test]
    fn test_scale_applies_to_track() {
        let config = RenderConfig {
            scale: 2.0,
            ..RenderConfig::default()
        };
        let mut surface = RecordingSurface::default();
        Renderer::new(config).paint(&mut surface, &track(), &cars(), None);
        assert_eq!(surface.ops[1], Op::Polyline(vec![[0.0, 0.0], [20.0, 0.0], [20.0, 20.0]]));
    }

    #[test]
    fn test_canvas_extent_covers_track() {
        let renderer = Renderer::new(RenderConfig::default());
        assert_eq!(renderer.canvas_extent(&track()), [40.0, 25.0]);
    }
}
