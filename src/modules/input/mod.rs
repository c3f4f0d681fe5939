#[cfg(feature = "opencv")]
mod video;

#[cfg(feature = "opencv")]
pub use video::VideoInput;
