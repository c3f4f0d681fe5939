//! Plane-to-plane homography from manually clicked reference points.
//!
//! The estimate is a normalized direct linear transform: both point sets are
//! translated to their centroid and scaled to a mean distance of sqrt(2),
//! the 2n x 9 constraint system is solved through the smallest eigenvector
//! of its normal matrix, and the result is denormalized. Four consistent
//! points give the exact transform, more give the algebraic least squares
//! fit. Reference points are placed by hand, so there is no outlier
//! rejection.

use itertools::Itertools;
use log::debug;
use nalgebra::{DMatrix, Matrix3, SymmetricEigen, Vector3};

use crate::error::{Error, Result};
use crate::geometry::{Correspondence, PixelPoint, RealPoint};

/// A projective transform has 8 degrees of freedom, 2 per correspondence.
pub const MIN_CORRESPONDENCES: usize = 4;

// Relative to the spread of the normalized points, which is ~2 by construction.
const SPREAD_TOLERANCE: f64 = 1e-9;
// Relative to the largest eigenvalue of the normal matrix.
const RANK_TOLERANCE: f64 = 1e-9;
// Determinant of the unit-norm normalized matrix.
const SINGULAR_TOLERANCE: f64 = 1e-9;
// Relative to the magnitude of the terms summed into the weight.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Maps homogeneous pixel coordinates to homogeneous real-world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
	matrix: Matrix3<f64>,
}

impl Homography {
	/// Pairs `pixels[i]` with `reals[i]` and estimates the transform.
	pub fn from_points(pixels: &[PixelPoint], reals: &[RealPoint]) -> Result<Self> {
		if pixels.len() != reals.len() {
			return Err(Error::Calibration(format!(
				"{} pixel points but {} real-world points",
				pixels.len(),
				reals.len()
			)));
		}

		let correspondences = pixels
			.iter()
			.zip_eq(reals)
			.map(|(&pixel, &real)| Correspondence::new(pixel, real))
			.collect_vec();
		compute_homography(&correspondences)
	}

	pub fn matrix(&self) -> &Matrix3<f64> {
		&self.matrix
	}

	/// Applies the transform to one pixel and de-homogenizes the result.
	pub fn project(&self, pixel: PixelPoint) -> Result<RealPoint> {
		let p = self.matrix * Vector3::new(pixel.x, pixel.y, 1.0);
		let magnitude = (self.matrix[(2, 0)] * pixel.x).abs()
			+ (self.matrix[(2, 1)] * pixel.y).abs()
			+ self.matrix[(2, 2)].abs();
		if p[2].abs() <= WEIGHT_EPSILON * magnitude || !p[2].is_finite() {
			return Err(Error::DegenerateTransform { x: pixel.x, y: pixel.y });
		}
		Ok(RealPoint::new(p[0] / p[2], p[1] / p[2]))
	}
}

/// Estimates the homography taking every `pixel` onto its `real` partner.
pub fn compute_homography(correspondences: &[Correspondence]) -> Result<Homography> {
	let n = correspondences.len();
	if n < MIN_CORRESPONDENCES {
		return Err(Error::InsufficientCalibrationPoints {
			needed: MIN_CORRESPONDENCES,
			got: n,
		});
	}

	let src = correspondences.iter().map(|c| [c.pixel.x, c.pixel.y]).collect_vec();
	let dst = correspondences.iter().map(|c| [c.real.x, c.real.y]).collect_vec();

	let (t_src, src_n) = normalize_points(&src, "pixel")?;
	let (t_dst, dst_n) = normalize_points(&dst, "real-world")?;

	let mut a = DMatrix::zeros(2 * n, 9);
	for i in 0..n {
		let [sx, sy] = src_n[i];
		let [dx, dy] = dst_n[i];

		// [  0   0   0 | -sx -sy -1 |  dy*sx  dy*sy  dy ]
		a[(2 * i, 3)] = -sx;
		a[(2 * i, 4)] = -sy;
		a[(2 * i, 5)] = -1.0;
		a[(2 * i, 6)] = dy * sx;
		a[(2 * i, 7)] = dy * sy;
		a[(2 * i, 8)] = dy;

		// [ sx  sy   1 |   0   0  0 | -dx*sx -dx*sy -dx ]
		a[(2 * i + 1, 0)] = sx;
		a[(2 * i + 1, 1)] = sy;
		a[(2 * i + 1, 2)] = 1.0;
		a[(2 * i + 1, 6)] = -dx * sx;
		a[(2 * i + 1, 7)] = -dx * sy;
		a[(2 * i + 1, 8)] = -dx;
	}

	// A thin SVD of an 8x9 system drops the null vector, the 9x9 normal matrix keeps it.
	let ata = a.transpose() * &a;
	let eig = SymmetricEigen::new(ata);
	let order = (0..9)
		.sorted_by(|&i, &j| eig.eigenvalues[i].abs().total_cmp(&eig.eigenvalues[j].abs()))
		.collect_vec();

	let largest = eig.eigenvalues[order[8]].abs();
	let second = eig.eigenvalues[order[1]].abs();
	if second <= RANK_TOLERANCE * largest {
		return Err(Error::Calibration(
			"reference points do not determine a unique transform".to_string(),
		));
	}

	let h = eig.eigenvectors.column(order[0]);
	let h_norm = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);
	if h_norm.determinant().abs() < SINGULAR_TOLERANCE {
		return Err(Error::Calibration(
			"reference points collapse the image plane (three or more are collinear)".to_string(),
		));
	}

	let t_dst_inv = t_dst
		.try_inverse()
		.ok_or_else(|| Error::Calibration("real-world normalization is not invertible".to_string()))?;
	let matrix = t_dst_inv * h_norm * t_src;

	let scale = matrix[(2, 2)];
	let matrix = if scale.abs() > WEIGHT_EPSILON * matrix.norm() {
		matrix / scale
	} else {
		matrix / matrix.norm()
	};

	debug!("homography from {} correspondences: {}", n, matrix);
	Ok(Homography { matrix })
}

// Translate the centroid to the origin and scale to a mean distance of sqrt(2).
fn normalize_points(pts: &[[f64; 2]], label: &str) -> Result<(Matrix3<f64>, Vec<[f64; 2]>)> {
	let n = pts.len() as f64;
	let cx = pts.iter().map(|p| p[0]).sum::<f64>() / n;
	let cy = pts.iter().map(|p| p[1]).sum::<f64>() / n;

	let mean_dist = pts
		.iter()
		.map(|p| ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt())
		.sum::<f64>()
		/ n;
	if !mean_dist.is_finite() || mean_dist < 1e-12 {
		return Err(Error::Calibration(format!("{} reference points coincide", label)));
	}

	let s = std::f64::consts::SQRT_2 / mean_dist;
	let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
	let normalized = pts.iter().map(|p| [s * (p[0] - cx), s * (p[1] - cy)]).collect_vec();

	// Smallest eigenvalue of the 2x2 scatter matrix is ~0 iff the points lie on a line.
	let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
	for [x, y] in &normalized {
		sxx += x * x;
		syy += y * y;
		sxy += x * y;
	}
	let trace = sxx + syy;
	let spread = ((sxx - syy).powi(2) + 4.0 * sxy * sxy).sqrt();
	let smallest = (trace - spread) / 2.0;
	if smallest <= SPREAD_TOLERANCE * trace {
		return Err(Error::Calibration(format!("{} reference points are collinear", label)));
	}

	Ok((t, normalized))
}
