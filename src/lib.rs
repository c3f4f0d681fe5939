//! Manual trajectory digitizing for lab videos.
//!
//! An operator clicks at least four reference points on a calibration frame
//! and types their real-world coordinates. The resulting homography turns
//! every point clicked while stepping through the video into real-world
//! units, relative to the first marked position, and the rows end up in a
//! CSV file.

pub mod calibration;
pub mod config;
pub mod error;
pub mod geometry;
pub mod modules;
pub mod pipeline;
pub mod session;
pub mod trajectory;
pub mod transform;

pub use calibration::{compute_homography, Homography, MIN_CORRESPONDENCES};
pub use config::Settings;
pub use error::{Error, Result};
pub use geometry::{Correspondence, PixelPoint, RealPoint};
pub use session::{AnnotationSession, FrameRange, SessionState};
pub use trajectory::{relative_rows, ExportRow, TrajectorySample};
pub use transform::apply_transform;
