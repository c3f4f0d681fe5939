use crate::error::{Error, Result};
use crate::modules::Prompt;

use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Line based questions over any reader/writer pair.
pub struct ConsolePrompt<R, W> {
	input: R,
	output: W,
}

impl ConsolePrompt<StdinLock<'static>, Stdout> {
	pub fn stdio() -> Self {
		Self::new(io::stdin().lock(), io::stdout())
	}
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
	pub fn new(input: R, output: W) -> Self {
		Self { input, output }
	}

	pub fn into_output(self) -> W {
		self.output
	}
}

impl<R: BufRead, W: Write> Prompt for ConsolePrompt<R, W> {
	fn ask(&mut self, question: &str) -> Result<String> {
		write!(self.output, "{}", question)?;
		self.output.flush()?;

		let mut line = String::new();
		if self.input.read_line(&mut line)? == 0 {
			return Err(Error::InputClosed);
		}
		Ok(line.trim().to_string())
	}

	fn say(&mut self, message: &str) -> Result<()> {
		writeln!(self.output, "{}", message)?;
		self.output.flush()?;
		Ok(())
	}
}
