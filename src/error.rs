use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("could not open video {path:?}: {reason}")]
	VideoOpen { path: PathBuf, reason: String },

	#[error("could not decode frame {index}")]
	FrameRead { index: usize },

	#[error("need at least {needed} reference points for homography, got {got}")]
	InsufficientCalibrationPoints { needed: usize, got: usize },

	#[error("could not parse {input:?} as real-world coordinates: {reason}")]
	MalformedCoordinateInput { input: String, reason: String },

	#[error("{input:?} is not a frame index")]
	MalformedFrameIndex { input: String },

	#[error("invalid frame range {start}..={end} for a video with {total} frames")]
	InvalidFrameRange { start: usize, end: usize, total: usize },

	#[error("calibration failed: {0}")]
	Calibration(String),

	#[error("pixel ({x}, {y}) maps to infinity under the calibrated homography")]
	DegenerateTransform { x: f64, y: f64 },

	#[error("could not write export to {path:?}")]
	ExportIo {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("console input closed while waiting for an answer")]
	InputClosed,

	#[error("console i/o failed")]
	Io(#[from] io::Error),

	#[error("invalid settings: {0}")]
	Config(String),

	#[cfg(feature = "opencv")]
	#[error("opencv: {0}")]
	Display(#[from] opencv::Error),
}

impl Error {
	/// Errors the operator can fix by answering the prompt again.
	pub fn is_recoverable(&self) -> bool {
		matches!(
			self,
			Error::MalformedCoordinateInput { .. }
				| Error::MalformedFrameIndex { .. }
				| Error::InvalidFrameRange { .. }
		)
	}
}
