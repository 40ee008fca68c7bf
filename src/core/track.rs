use serde::{Deserialize, Serialize};

/// A point on the circuit outline, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

#[cfg(test)]
impl TrackPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl TrackPoint {
    /// Linear blend towards `other` by `alpha` (0 = self, 1 = other)
    pub fn lerp(&self, other: &TrackPoint, alpha: f64) -> TrackPoint {
        TrackPoint {
            x: self.x + (other.x - self.x) * alpha,
            y: self.y + (other.y - self.y) * alpha,
        }
    }
}

/// Where a progress fraction lands in the track's index space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLocation {
    pub lower: usize,
    pub upper: usize,
    pub alpha: f64,
    pub position: TrackPoint,
}

/// Ordered polyline approximating the circuit centerline.
///
/// Point order defines the driving direction. The geometry is immutable once
/// loaded and replaced wholesale on a race switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackGeometry {
    points: Vec<TrackPoint>,
}

impl TrackGeometry {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Map a progress fraction onto the polyline.
    ///
    /// `progress * (len - 1)` is split into an integer segment index and a
    /// fractional blend; the upper index is clamped to the last point so
    /// `progress == 1.0` lands exactly on it. Returns `None` for an empty track.
    pub fn locate(&self, progress: f64) -> Option<TrackLocation> {
        let last = self.points.len().checked_sub(1)?;

        let track_index = progress * last as f64;
        let lower = (track_index.floor().max(0.0) as usize).min(last);
        let upper = (lower + 1).min(last);
        let alpha = track_index - lower as f64;

        let position = if lower == upper {
            self.points[lower]
        } else {
            self.points[lower].lerp(&self.points[upper], alpha)
        };

        Some(TrackLocation {
            lower,
            upper,
            alpha,
            position,
        })
    }
}

#[cfg(test)]
impl TrackGeometry {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Interpolated position for a progress fraction
    pub fn interpolate(&self, progress: f64) -> Option<TrackPoint> {
        self.locate(progress).map(|loc| loc.position)
    }
}

impl From<Vec<TrackPoint>> for TrackGeometry {
    fn from(points: Vec<TrackPoint>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> TrackGeometry {
        TrackGeometry::new(vec![
            TrackPoint::new(0.0, 0.0),
            TrackPoint::new(10.0, 0.0),
            TrackPoint::new(10.0, 10.0),
        ])
    }

    #[test]
    fn test_empty_track_has_no_position() {
        assert_eq!(TrackGeometry::default().interpolate(0.5), None);
    }

    #[test]
    fn test_boundaries_are_exact() {
        let track = l_shape();
        assert_eq!(track.interpolate(0.0), Some(TrackPoint::new(0.0, 0.0)));
        assert_eq!(track.interpolate(1.0), Some(TrackPoint::new(10.0, 10.0)));
    }

    #[test]
    fn test_quarter_progress_lands_mid_first_segment() {
        let loc = l_shape().locate(0.25).unwrap();
        assert_eq!(loc.lower, 0);
        assert_eq!(loc.upper, 1);
        assert!((loc.alpha - 0.5).abs() < 1e-12);
        assert_eq!(loc.position, TrackPoint::new(5.0, 0.0));
    }

    #[test]
    fn test_position_stays_on_segment() {
        let track = l_shape();
        for step in 0..=100 {
            let progress = step as f64 / 100.0;
            let loc = track.locate(progress).unwrap();
            let a = track.points()[loc.lower];
            let b = track.points()[loc.upper];
            let p = loc.position;
            assert!(p.x >= a.x.min(b.x) - 1e-9 && p.x <= a.x.max(b.x) + 1e-9);
            assert!(p.y >= a.y.min(b.y) - 1e-9 && p.y <= a.y.max(b.y) + 1e-9);
        }
    }

    #[test]
    fn test_single_point_track() {
        let track = TrackGeometry::new(vec![TrackPoint::new(3.0, 4.0)]);
        assert_eq!(track.interpolate(0.7), Some(TrackPoint::new(3.0, 4.0)));
    }
}
