pub mod car;
pub mod telemetry;
pub mod track;

pub use car::{Car, ImageHandle};
pub use telemetry::{Bracket, TelemetrySample, TelemetrySeries};
pub use track::{TrackGeometry, TrackPoint};
