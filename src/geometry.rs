use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A position in image pixel space, as delivered by a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
	pub x: f64,
	pub y: f64,
}

impl PixelPoint {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl fmt::Display for PixelPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.x, self.y)
	}
}

/// A position in the operator's real-world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealPoint {
	pub x: f64,
	pub y: f64,
}

impl RealPoint {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl fmt::Display for RealPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.x, self.y)
	}
}

// Accepts "x,y" with optional whitespace around either value.
impl FromStr for RealPoint {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let malformed = |reason: &str| Error::MalformedCoordinateInput {
			input: s.to_string(),
			reason: reason.to_string(),
		};

		let mut parts = s.trim().split(',');
		let (x, y) = match (parts.next(), parts.next(), parts.next()) {
			(Some(x), Some(y), None) => (x.trim(), y.trim()),
			_ => return Err(malformed("expected exactly two comma separated values")),
		};

		let x: f64 = x.parse().map_err(|_| malformed("x is not a number"))?;
		let y: f64 = y.parse().map_err(|_| malformed("y is not a number"))?;
		if !x.is_finite() || !y.is_finite() {
			return Err(malformed("coordinates must be finite"));
		}

		Ok(Self::new(x, y))
	}
}

/// One reference point seen both in the image and in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
	pub pixel: PixelPoint,
	pub real: RealPoint,
}

impl Correspondence {
	pub fn new(pixel: PixelPoint, real: RealPoint) -> Self {
		Self { pixel, real }
	}
}
