use crate::geometry::{PixelPoint, RealPoint};

/// A confirmed object position on one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
	pub frame: usize,
	pub pixel: PixelPoint,
}

impl TrajectorySample {
	pub fn new(frame: usize, pixel: PixelPoint) -> Self {
		Self { frame, pixel }
	}
}

/// Real-world position of one sample relative to the first sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRow {
	pub frame: usize,
	pub x: f64,
	pub y: f64,
}

/// Pairs each sample with its transformed position and shifts everything so
/// the first sample sits at the origin.
pub fn relative_rows(samples: &[TrajectorySample], reals: &[RealPoint]) -> Vec<ExportRow> {
	let origin = match reals.first() {
		Some(origin) => *origin,
		None => return Vec::new(),
	};

	samples
		.iter()
		.zip(reals)
		.map(|(sample, real)| ExportRow {
			frame: sample.frame,
			x: real.x - origin.x,
			y: real.y - origin.y,
		})
		.collect()
}
