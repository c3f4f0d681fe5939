pub mod input;
pub mod display;
pub mod prompt;
pub mod output;

use crate::error::Result;
use crate::geometry::PixelPoint;
use crate::trajectory::ExportRow;

/// Navigation command decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	StepBack,
	StepForward,
	Confirm,
	Finish,
	Other(i32),
}

impl Command {
	/// Decodes a `wait_key` code. Only the low byte is looked at, which is
	/// where the arrow keys land on GTK and Qt builds.
	pub fn from_key(code: i32) -> Self {
		match code & 0xFF {
			81 | 97 => Command::StepBack,      // left arrow, 'a'
			83 | 100 => Command::StepForward,  // right arrow, 'd'
			32 | 13 | 10 => Command::Confirm,  // space, enter
			27 | 113 => Command::Finish,       // esc, 'q'
			_ => Command::Other(code),
		}
	}
}

/// What the operator did while a frame was on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
	Click(PixelPoint),
	Key(Command),
}

/// Decodes frames by index.
pub trait FrameSource {
	type Frame;

	fn frame_count(&self) -> usize;

	/// `Ok(None)` when the frame exists in the container but cannot be decoded.
	fn frame_at(&mut self, index: usize) -> Result<Option<Self::Frame>>;
}

/// Puts frames on screen and reports clicks and key presses.
pub trait Display<F> {
	/// Renders `frame` with a marker at every point in `marks`.
	fn show(&mut self, frame: &F, marks: &[PixelPoint]) -> Result<()>;

	/// Blocks until the operator clicks or presses a key.
	fn next_event(&mut self) -> Result<Event>;

	/// Drops clicks queued before the current frame was shown.
	fn discard_pending(&mut self) -> Result<()>;

	fn close(&mut self) -> Result<()>;
}

/// Console questions and messages for the operator.
pub trait Prompt {
	fn ask(&mut self, question: &str) -> Result<String>;
	fn say(&mut self, message: &str) -> Result<()>;
}

pub trait OutputModule {
	fn run(&mut self, rows: &[ExportRow]) -> Result<()>;
}
