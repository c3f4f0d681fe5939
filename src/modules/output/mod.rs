mod csvfile;

pub use csvfile::{export, CsvFile, HEADER};
