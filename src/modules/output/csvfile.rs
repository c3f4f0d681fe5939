use crate::error::{Error, Result};
use crate::modules::OutputModule;
use crate::trajectory::ExportRow;

use log::info;
use serde::Serialize;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 3] = ["Frame", "X (relative)", "Y (relative)"];

/// Writes rows as CSV to a fixed destination. The file only appears once
/// every row has been written.
pub struct CsvFile {
	destination: PathBuf,
}

#[derive(Serialize)]
struct CsvRow {
	frame: usize,
	x: f64,
	y: f64,
}

impl From<&ExportRow> for CsvRow {
	fn from(row: &ExportRow) -> Self {
		Self {
			frame: row.frame,
			x: round_2(row.x),
			y: round_2(row.y),
		}
	}
}

impl OutputModule for CsvFile {
	fn run(&mut self, rows: &[ExportRow]) -> Result<()> {
		self.write(rows).map_err(|source| Error::ExportIo {
			path: self.destination.clone(),
			source,
		})?;

		let shown = fs::canonicalize(&self.destination).unwrap_or_else(|_| self.destination.clone());
		info!("Coordinates exported to {}", shown.display());
		Ok(())
	}
}

impl CsvFile {
	pub fn new(destination: impl Into<PathBuf>) -> Self {
		Self {
			destination: destination.into(),
		}
	}

	pub fn destination(&self) -> &Path {
		&self.destination
	}

	fn write(&self, rows: &[ExportRow]) -> io::Result<()> {
		let dir = match self.destination.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};
		let mut staged = tempfile::Builder::new()
			.prefix(".ferrotrace-")
			.suffix(".csv.tmp")
			.tempfile_in(dir)?;

		{
			let mut writer = csv::WriterBuilder::new()
				.has_headers(false)
				.from_writer(staged.as_file_mut());
			writer.write_record(HEADER)?;
			for row in rows {
				writer.serialize(CsvRow::from(row))?;
			}
			writer.flush()?;
		}

		staged.persist(&self.destination).map_err(|e| e.error)?;
		Ok(())
	}
}

/// Writes `rows` to `destination`, see [`CsvFile`].
pub fn export(rows: &[ExportRow], destination: &Path) -> Result<()> {
	CsvFile::new(destination).run(rows)
}

// Adding 0.0 folds -0.0 into 0.0 so it never prints as "-0.0".
fn round_2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0 + 0.0
}

#[cfg(test)]
mod tests {
	use super::*;

	fn read(path: &Path) -> String {
		fs::read_to_string(path).unwrap()
	}

	#[test]
	fn empty_rows_write_header_only() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.csv");
		export(&[], &path).unwrap();
		assert_eq!(read(&path), "Frame,X (relative),Y (relative)\n");
	}

	#[test]
	fn coordinates_are_rounded_to_two_decimals() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.csv");
		let rows = [
			ExportRow { frame: 10, x: 0.0, y: 0.0 },
			ExportRow { frame: 12, x: 0.12345, y: -1.006 },
			ExportRow { frame: 14, x: -0.001, y: 2.5 },
		];
		export(&rows, &path).unwrap();
		assert_eq!(
			read(&path),
			"Frame,X (relative),Y (relative)\n10,0.0,0.0\n12,0.12,-1.01\n14,0.0,2.5\n"
		);
	}

	#[test]
	fn overwrites_existing_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.csv");
		fs::write(&path, "stale contents that are longer than the header\n").unwrap();
		export(&[], &path).unwrap();
		assert_eq!(read(&path), "Frame,X (relative),Y (relative)\n");
	}

	#[test]
	fn unwritable_destination_leaves_nothing_behind() {
		let dir = tempfile::tempdir().unwrap();
		let target = dir.path().join("missing").join("out.csv");
		let err = export(&[ExportRow { frame: 0, x: 0.0, y: 0.0 }], &target).unwrap_err();
		assert!(matches!(err, Error::ExportIo { .. }));
		assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
	}

	#[test]
	fn directory_destination_is_an_export_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = export(&[], dir.path()).unwrap_err();
		assert!(matches!(err, Error::ExportIo { .. }));
		assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
	}
}
