use ferrotrace::modules::display::HighGuiDisplay;
use ferrotrace::modules::input::VideoInput;
use ferrotrace::modules::output::CsvFile;
use ferrotrace::modules::prompt::ConsolePrompt;
use ferrotrace::modules::Prompt;
use ferrotrace::{pipeline, Settings};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ferrotrace", about = "Digitize an object's trajectory from a video")]
struct Args {
	/// Video to digitize, asked for on the console when omitted
	video: Option<PathBuf>,
	/// Settings file (default: ferrotrace.toml in the working directory, if present)
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,
	/// Where to write the CSV, overrides output.destination_path
	#[arg(long, value_name = "PATH")]
	output: Option<PathBuf>,
	/// Frames per navigation step, overrides navigation.stride
	#[arg(long)]
	stride: Option<usize>,
}

// Main
fn main() -> Result<()> {
	let mut logger = pretty_env_logger::formatted_builder();
	logger.filter_level(LevelFilter::Info);
	if let Ok(filters) = std::env::var("RUST_LOG") {
		logger.parse_filters(&filters);
	}
	logger.init();

	let args = Args::parse();

	//Load Settings
	let mut settings = Settings::discover(args.config.as_deref()).context("loading settings")?;
	if let Some(output) = args.output {
		settings.output.destination_path = output;
	}
	if let Some(stride) = args.stride {
		settings.navigation.stride = stride;
	}
	settings.validate()?;

	let mut prompt = ConsolePrompt::stdio();
	let video = match args.video {
		Some(video) => video,
		None => PathBuf::from(prompt.ask("Enter path to video file: ")?),
	};

	//Input, Display and Output Modules
	let mut input = VideoInput::open(&video)?;
	let mut display = HighGuiDisplay::new(&settings.display.window_name, settings.display.marker_radius)?;
	let mut output = CsvFile::new(&settings.output.destination_path);

	let rows = pipeline::run(&settings, &mut input, &mut display, &mut prompt, &mut output)
		.with_context(|| format!("digitizing {}", video.display()))?;

	info!("{} rows written to {}", rows.len(), output.destination().display());
	Ok(())
}
