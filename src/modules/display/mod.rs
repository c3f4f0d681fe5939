#[cfg(feature = "opencv")]
mod highgui;

#[cfg(feature = "opencv")]
pub use self::highgui::HighGuiDisplay;
