use crate::error::{Error, Result};
use crate::geometry::PixelPoint;
use crate::modules::{Command, Display, Event};

use opencv::core::{Mat, Point, Scalar};
use opencv::highgui;
use opencv::imgproc;
use opencv::prelude::*;

use log::debug;

use std::sync::mpsc::{self, Receiver, Sender};

// wait_key timeout between checks for queued clicks
const POLL_MS: i32 = 30;

/// One OpenCV window. The mouse callback only queues clicks; they are
/// handed out by `next_event` on the caller's thread.
pub struct HighGuiDisplay {
	window: String,
	marker_radius: i32,
	clicks: Receiver<PixelPoint>,
	sender: Sender<PixelPoint>,
}

impl Display<Mat> for HighGuiDisplay {
	fn show(&mut self, frame: &Mat, marks: &[PixelPoint]) -> Result<()> {
		// A closed window takes its mouse callback with it.
		if window_gone(highgui::get_window_property(&self.window, highgui::WND_PROP_VISIBLE)) {
			debug!("recreating window {:?}", self.window);
			self.open_window()?;
		}

		let mut canvas = frame.try_clone()?;
		for mark in marks {
			imgproc::circle(
				&mut canvas,
				Point::new(mark.x.round() as i32, mark.y.round() as i32),
				self.marker_radius,
				Scalar::new(0., 0., 255., 0.),
				-1,
				imgproc::LINE_8,
				0,
			)?;
		}
		highgui::imshow(&self.window, &canvas)?;
		Ok(())
	}

	fn next_event(&mut self) -> Result<Event> {
		loop {
			if let Ok(click) = self.clicks.try_recv() {
				return Ok(Event::Click(click));
			}

			let key = highgui::wait_key(POLL_MS)?;
			if key >= 0 {
				debug!("key {}", key);
				return Ok(Event::Key(Command::from_key(key)));
			}

			// Closing the window ends whatever pass is running.
			if window_gone(highgui::get_window_property(&self.window, highgui::WND_PROP_VISIBLE)) {
				return Ok(Event::Key(Command::Finish));
			}
		}
	}

	fn discard_pending(&mut self) -> Result<()> {
		let dropped = self.clicks.try_iter().count();
		if dropped > 0 {
			debug!("discarded {} stale clicks", dropped);
		}
		Ok(())
	}

	fn close(&mut self) -> Result<()> {
		highgui::destroy_all_windows()?;
		// Let the backend process the destroy before anything else is shown.
		highgui::wait_key(1)?;
		self.discard_pending()
	}
}

impl HighGuiDisplay {
	pub fn new(window: &str, marker_radius: u32) -> Result<Self> {
		let marker_radius = i32::try_from(marker_radius)
			.map_err(|_| Error::Config(format!("display.marker_radius {} is too large", marker_radius)))?;

		let (sender, clicks) = mpsc::channel();
		let display = Self {
			window: window.to_string(),
			marker_radius,
			clicks,
			sender,
		};
		display.open_window()?;
		Ok(display)
	}

	fn open_window(&self) -> Result<()> {
		highgui::named_window(&self.window, highgui::WINDOW_AUTOSIZE)?;

		let tx = self.sender.clone();
		highgui::set_mouse_callback(
			&self.window,
			Some(Box::new(move |event, x, y, _flags| {
				if event == highgui::EVENT_LBUTTONDOWN {
					// The receiver only goes away with the display itself.
					let _ = tx.send(PixelPoint::new(x as f64, y as f64));
				}
			})),
		)?;
		Ok(())
	}
}

// Backends report a destroyed window either as an error or as a negative property.
fn window_gone(visible: opencv::Result<f64>) -> bool {
	visible.map_or(true, |v| v < 1.0)
}
