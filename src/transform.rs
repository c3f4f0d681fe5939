use crate::calibration::Homography;
use crate::error::Result;
use crate::geometry::{PixelPoint, RealPoint};

/// Maps every pixel through `homography`, keeping order. Fails on the first
/// point whose homogeneous weight vanishes.
pub fn apply_transform(homography: &Homography, points: &[PixelPoint]) -> Result<Vec<RealPoint>> {
	points.iter().map(|&p| homography.project(p)).collect()
}
