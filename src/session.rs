//! The interactive part of a run: clicking reference points, typing their
//! real-world positions, choosing a frame range and marking the object
//! frame by frame.
//!
//! All mutable state of a run lives in [`AnnotationSession`]. The display
//! and console are borrowed collaborators, so the whole state machine can be
//! driven by scripted events in tests.

use log::{debug, info, warn};

use crate::calibration::MIN_CORRESPONDENCES;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::geometry::{Correspondence, PixelPoint, RealPoint};
use crate::modules::{Command, Display, Event, FrameSource, Prompt};
use crate::trajectory::TrajectorySample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
	AwaitingCalibrationClicks,
	AwaitingRealWorldEntry,
	AwaitingFrameRange,
	MarkingTrajectory,
	Done,
}

/// Inclusive range of frames to mark, always inside the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
	start: usize,
	end: usize,
}

impl FrameRange {
	pub fn new(start: usize, end: usize, total: usize) -> Result<Self> {
		if start > end || end >= total {
			return Err(Error::InvalidFrameRange { start, end, total });
		}
		Ok(Self { start, end })
	}

	pub fn start(&self) -> usize {
		self.start
	}

	pub fn end(&self) -> usize {
		self.end
	}

	pub fn step_back(&self, index: usize, stride: usize) -> usize {
		index.saturating_sub(stride).max(self.start)
	}

	pub fn step_forward(&self, index: usize, stride: usize) -> usize {
		index.saturating_add(stride).min(self.end)
	}
}

fn parse_frame_index(answer: &str) -> Result<usize> {
	answer.trim().parse().map_err(|_| Error::MalformedFrameIndex {
		input: answer.to_string(),
	})
}

pub struct AnnotationSession<'a, S, D, P> {
	source: &'a mut S,
	display: &'a mut D,
	prompt: &'a mut P,

	stride: usize,
	reference_frame: usize,

	state: SessionState,
	calibration_clicks: Vec<PixelPoint>,
	correspondences: Vec<Correspondence>,
	range: Option<FrameRange>,
	cursor: usize,
	samples: Vec<TrajectorySample>,
}

impl<'a, S, D, P> AnnotationSession<'a, S, D, P>
where
	S: FrameSource,
	D: Display<S::Frame>,
	P: Prompt,
{
	pub fn new(source: &'a mut S, display: &'a mut D, prompt: &'a mut P, settings: &Settings) -> Self {
		Self {
			source,
			display,
			prompt,
			stride: settings.navigation.stride.max(1),
			reference_frame: settings.calibration.reference_frame,
			state: SessionState::AwaitingCalibrationClicks,
			calibration_clicks: Vec::new(),
			correspondences: Vec::new(),
			range: None,
			cursor: 0,
			samples: Vec::new(),
		}
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	pub fn range(&self) -> Option<FrameRange> {
		self.range
	}

	/// Runs the handler of the current state and moves to the next one.
	pub fn step(&mut self) -> Result<SessionState> {
		self.state = match self.state {
			SessionState::AwaitingCalibrationClicks => {
				self.collect_calibration_clicks()?;
				SessionState::AwaitingRealWorldEntry
			}
			SessionState::AwaitingRealWorldEntry => {
				self.enter_real_world_points()?;
				SessionState::AwaitingFrameRange
			}
			SessionState::AwaitingFrameRange => {
				self.choose_frame_range()?;
				SessionState::MarkingTrajectory
			}
			SessionState::MarkingTrajectory => {
				if self.mark_current_frame()? {
					SessionState::Done
				} else {
					SessionState::MarkingTrajectory
				}
			}
			SessionState::Done => SessionState::Done,
		};
		Ok(self.state)
	}

	/// Calibration pass: clicks on the reference frame, then their real-world
	/// coordinates.
	pub fn calibrate(&mut self) -> Result<&[Correspondence]> {
		while self.state < SessionState::AwaitingFrameRange {
			self.step()?;
		}
		Ok(&self.correspondences)
	}

	/// Marking pass: frame range, then frame by frame navigation until the
	/// range is exhausted or the operator finishes.
	pub fn mark_trajectory(&mut self) -> Result<&[TrajectorySample]> {
		while self.state < SessionState::Done {
			self.step()?;
		}
		Ok(&self.samples)
	}

	fn collect_calibration_clicks(&mut self) -> Result<()> {
		let total = self.source.frame_count();
		if self.reference_frame >= total {
			return Err(Error::Config(format!(
				"calibration.reference_frame {} is past the last frame {}",
				self.reference_frame,
				total.saturating_sub(1)
			)));
		}
		let frame = self
			.source
			.frame_at(self.reference_frame)?
			.ok_or(Error::FrameRead {
				index: self.reference_frame,
			})?;

		self.prompt.say(&format!(
			"Define at least {} calibration points on frame {}.",
			MIN_CORRESPONDENCES, self.reference_frame
		))?;
		self.prompt.say("These are used to correct perspective and establish scale.")?;
		self.prompt.say("Click the known reference points, then press any key.")?;

		self.display.show(&frame, &self.calibration_clicks)?;
		while let Event::Click(point) = self.display.next_event()? {
			self.calibration_clicks.push(point);
			info!("reference point {}: {}", self.calibration_clicks.len(), point);
			self.display.show(&frame, &self.calibration_clicks)?;
		}
		// Clicks made while the console has focus belong to no frame.
		self.display.close()?;
		self.display.discard_pending()?;

		if self.calibration_clicks.len() < MIN_CORRESPONDENCES {
			return Err(Error::InsufficientCalibrationPoints {
				needed: MIN_CORRESPONDENCES,
				got: self.calibration_clicks.len(),
			});
		}
		Ok(())
	}

	fn enter_real_world_points(&mut self) -> Result<()> {
		self.prompt.say("Now enter the real-world coordinates (x, y) for the reference points.")?;

		let clicks = self.calibration_clicks.clone();
		for (i, pixel) in clicks.into_iter().enumerate() {
			let question = format!("Real-world coordinates for point {} (format: x,y): ", i + 1);
			let real = self.ask_until_valid(&question, |answer| answer.parse::<RealPoint>())?;
			debug!("reference point {}: {} -> {}", i + 1, pixel, real);
			self.correspondences.push(Correspondence::new(pixel, real));
		}
		Ok(())
	}

	fn choose_frame_range(&mut self) -> Result<()> {
		let total = self.source.frame_count();
		if total == 0 {
			return Err(Error::FrameRead { index: 0 });
		}

		let range = loop {
			let start = self.ask_until_valid(&format!("Enter start frame (0 to {}): ", total - 1), |answer| {
				let start = parse_frame_index(answer)?;
				if start >= total {
					return Err(Error::InvalidFrameRange { start, end: start, total });
				}
				Ok(start)
			})?;
			let end = self.ask_until_valid(
				&format!("Enter end frame ({} to {}): ", start, total - 1),
				parse_frame_index,
			)?;
			match FrameRange::new(start, end, total) {
				Ok(range) => break range,
				Err(err) => self.prompt.say(&format!("{}, try again", err))?,
			}
		};

		info!("marking frames {} to {} with stride {}", range.start(), range.end(), self.stride);
		self.prompt.say("Calibration is done. Mark the object position in each frame.")?;
		self.prompt.say("Left/right (or a/d) to navigate, space to confirm a point, esc to finish.")?;

		self.range = Some(range);
		self.cursor = range.start();
		Ok(())
	}

	// Returns true once the marking pass is over.
	fn mark_current_frame(&mut self) -> Result<bool> {
		let range = match self.range {
			Some(range) => range,
			None => return Ok(true),
		};
		let index = self.cursor;

		let frame = match self.source.frame_at(index)? {
			Some(frame) => frame,
			None => {
				warn!("could not decode frame {}, ending the marking pass", index);
				return Ok(true);
			}
		};

		let mut candidate = None;
		let confirmed = self.sample_at(index).map(|s| s.pixel);
		self.display.show(&frame, confirmed.as_slice())?;
		self.display.discard_pending()?;

		loop {
			let next = match self.display.next_event()? {
				Event::Click(point) => {
					info!("Point on frame {}: {}", index, point);
					candidate = Some(point);
					self.display.show(&frame, &[point])?;
					continue;
				}
				Event::Key(Command::StepBack) => range.step_back(index, self.stride),
				Event::Key(Command::StepForward) => range.step_forward(index, self.stride),
				Event::Key(Command::Confirm) => {
					match candidate {
						Some(point) => {
							self.record_sample(index, point);
							info!("Point registered for frame {}", index);
						}
						None => warn!("no point clicked on frame {}, nothing registered", index),
					}
					if index >= range.end() {
						return Ok(true);
					}
					range.step_forward(index, self.stride)
				}
				Event::Key(Command::Finish) => return Ok(true),
				Event::Key(Command::Other(code)) => {
					debug!("ignoring key {}", code);
					continue;
				}
			};

			if next == index {
				debug!("already at frame {}", index);
				continue;
			}
			info!("Moving to frame {}", next);
			self.cursor = next;
			return Ok(false);
		}
	}

	fn sample_at(&self, frame: usize) -> Option<&TrajectorySample> {
		self.samples
			.binary_search_by_key(&frame, |s| s.frame)
			.ok()
			.map(|i| &self.samples[i])
	}

	// One sample per frame, kept sorted by frame.
	fn record_sample(&mut self, frame: usize, pixel: PixelPoint) {
		let sample = TrajectorySample::new(frame, pixel);
		match self.samples.binary_search_by_key(&frame, |s| s.frame) {
			Ok(i) => self.samples[i] = sample,
			Err(i) => self.samples.insert(i, sample),
		}
	}

	fn ask_until_valid<T>(&mut self, question: &str, parse: impl Fn(&str) -> Result<T>) -> Result<T> {
		loop {
			let answer = self.prompt.ask(question)?;
			match parse(&answer) {
				Ok(value) => return Ok(value),
				Err(err) if err.is_recoverable() => {
					warn!("{}", err);
					self.prompt.say(&format!("{}, try again", err))?;
				}
				Err(err) => return Err(err),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frame_range_bounds() {
		assert!(FrameRange::new(0, 0, 1).is_ok());
		assert!(FrameRange::new(3, 9, 10).is_ok());
		assert!(matches!(
			FrameRange::new(5, 4, 10),
			Err(Error::InvalidFrameRange { start: 5, end: 4, total: 10 })
		));
		assert!(FrameRange::new(0, 10, 10).is_err());
		assert!(FrameRange::new(0, 0, 0).is_err());
	}

	#[test]
	fn steps_clamp_to_range() {
		let range = FrameRange::new(4, 11, 20).unwrap();
		assert_eq!(range.step_forward(4, 2), 6);
		assert_eq!(range.step_forward(10, 2), 11);
		assert_eq!(range.step_back(5, 2), 4);
		assert_eq!(range.step_back(1, 2), 4);
		assert_eq!(range.step_forward(usize::MAX, 2), 11);
	}

	#[test]
	fn frame_index_must_be_an_integer() {
		assert_eq!(parse_frame_index(" 12 ").unwrap(), 12);
		for bad in ["", "-1", "1.5", "ten"] {
			assert!(matches!(parse_frame_index(bad), Err(Error::MalformedFrameIndex { .. })));
		}
	}
}
