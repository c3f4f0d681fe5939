use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "ferrotrace.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	pub output: OutputSettings,
	pub navigation: NavigationSettings,
	pub calibration: CalibrationSettings,
	pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
	pub destination_path: PathBuf,
}

impl Default for OutputSettings {
	fn default() -> Self {
		Self {
			destination_path: PathBuf::from("trajectory.csv"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationSettings {
	/// Frames skipped per step forward or back.
	pub stride: usize,
}

impl Default for NavigationSettings {
	fn default() -> Self {
		Self { stride: 2 }
	}
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationSettings {
	/// Frame shown while clicking reference points.
	pub reference_frame: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySettings {
	pub window_name: String,
	pub marker_radius: u32,
}

impl Default for DisplaySettings {
	fn default() -> Self {
		Self {
			window_name: String::from("Video"),
			marker_radius: 5,
		}
	}
}

impl Settings {
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let settings: Settings = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
		Self::from_toml_str(&content)
	}

	/// Loads `path` if given, else the default file if it exists, else defaults.
	pub fn discover(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::load(path),
			None => {
				let default = Path::new(DEFAULT_SETTINGS_FILE);
				if default.is_file() {
					Self::load(default)
				} else {
					Ok(Self::default())
				}
			}
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.navigation.stride == 0 {
			return Err(Error::Config("navigation.stride must be at least 1".to_string()));
		}
		if self.display.marker_radius == 0 {
			return Err(Error::Config("display.marker_radius must be at least 1".to_string()));
		}
		if i32::try_from(self.display.marker_radius).is_err() {
			return Err(Error::Config(format!(
				"display.marker_radius must be at most {}",
				i32::MAX
			)));
		}
		if self.display.window_name.trim().is_empty() {
			return Err(Error::Config("display.window_name must not be empty".to_string()));
		}
		if self.output.destination_path.as_os_str().is_empty() {
			return Err(Error::Config("output.destination_path must not be empty".to_string()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_file_gives_defaults() {
		let settings = Settings::from_toml_str("").unwrap();
		assert_eq!(settings, Settings::default());
		assert_eq!(settings.navigation.stride, 2);
		assert_eq!(settings.output.destination_path, PathBuf::from("trajectory.csv"));
	}

	#[test]
	fn partial_file_overrides_only_named_fields() {
		let settings = Settings::from_toml_str(
			r#"
			[output]
			destination_path = "runs/marble.csv"

			[navigation]
			stride = 1
			"#,
		)
		.unwrap();
		assert_eq!(settings.output.destination_path, PathBuf::from("runs/marble.csv"));
		assert_eq!(settings.navigation.stride, 1);
		assert_eq!(settings.display, DisplaySettings::default());
	}

	#[test]
	fn zero_stride_is_rejected() {
		let err = Settings::from_toml_str("[navigation]\nstride = 0\n").unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn marker_radius_must_fit_a_pixel_coordinate() {
		let err = Settings::from_toml_str("[display]\nmarker_radius = 3000000000\n").unwrap_err();
		assert!(matches!(err, Error::Config(_)));
		let settings = Settings::from_toml_str("[display]\nmarker_radius = 2147483647\n").unwrap();
		assert_eq!(settings.display.marker_radius, i32::MAX as u32);
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let err = Settings::from_toml_str("[navigation]\nstep = 3\n").unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let err = Settings::discover(Some(Path::new("does/not/exist.toml"))).unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}
}
