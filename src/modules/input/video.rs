use crate::error::{Error, Result};
use crate::modules::FrameSource;

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use log::info;

use std::path::Path;

pub struct VideoInput {
	cap: VideoCapture,
	frame_count: usize,
}

impl FrameSource for VideoInput {
	type Frame = Mat;

	fn frame_count(&self) -> usize {
		self.frame_count
	}

	fn frame_at(&mut self, index: usize) -> Result<Option<Mat>> {
		self.cap.set(videoio::CAP_PROP_POS_FRAMES, index as f64)?;
		let mut frame = Mat::default();
		if !self.cap.read(&mut frame)? || frame.empty() {
			return Ok(None);
		}
		Ok(Some(frame))
	}
}

impl VideoInput {
	pub fn open(path: &Path) -> Result<Self> {
		let failed = |reason: String| Error::VideoOpen {
			path: path.to_path_buf(),
			reason,
		};

		let name = path.to_str().ok_or_else(|| failed("path is not valid UTF-8".to_string()))?;
		let cap = VideoCapture::from_file(name, videoio::CAP_ANY).map_err(|e| failed(e.to_string()))?;
		if !cap.is_opened()? {
			return Err(failed("no backend could open the file".to_string()));
		}

		let frame_count = cap.get(videoio::CAP_PROP_FRAME_COUNT)?;
		if !(frame_count >= 1.0) {
			return Err(failed("video reports no frames".to_string()));
		}

		info!(
			"opened {} ({} frames, {}x{} @ {} fps)",
			path.display(),
			frame_count,
			cap.get(videoio::CAP_PROP_FRAME_WIDTH)?,
			cap.get(videoio::CAP_PROP_FRAME_HEIGHT)?,
			cap.get(videoio::CAP_PROP_FPS)?,
		);

		Ok(Self {
			cap,
			frame_count: frame_count as usize,
		})
	}
}
