use itertools::Itertools;
use log::info;

use crate::calibration::compute_homography;
use crate::config::Settings;
use crate::error::Result;
use crate::modules::{Display, FrameSource, OutputModule, Prompt};
use crate::session::AnnotationSession;
use crate::trajectory::{relative_rows, ExportRow};
use crate::transform::apply_transform;

/// One full run: calibrate, compute the homography, mark the trajectory,
/// transform and hand the rows to `output`.
///
/// Nothing reaches `output` unless every earlier stage succeeded.
pub fn run<S, D, P, O>(
	settings: &Settings,
	source: &mut S,
	display: &mut D,
	prompt: &mut P,
	output: &mut O,
) -> Result<Vec<ExportRow>>
where
	S: FrameSource,
	D: Display<S::Frame>,
	P: Prompt,
	O: OutputModule + ?Sized,
{
	let (homography, samples) = {
		let mut session = AnnotationSession::new(source, display, prompt, settings);

		let correspondences = session.calibrate()?;
		let homography = compute_homography(correspondences)?;
		info!("calibrated from {} reference points", correspondences.len());

		(homography, session.mark_trajectory()?.to_vec())
	};
	display.close()?;

	let pixels = samples.iter().map(|s| s.pixel).collect_vec();
	let reals = apply_transform(&homography, &pixels)?;
	let rows = relative_rows(&samples, &reals);

	info!("{} samples in real-world units, relative to the first:", rows.len());
	for row in &rows {
		info!("{},{},{}", row.frame, row.x, row.y);
	}

	output.run(&rows)?;
	Ok(rows)
}
