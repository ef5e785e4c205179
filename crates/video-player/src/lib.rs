pub mod config;
pub mod controller;
pub mod engine;
pub mod listeners;
pub mod media;
pub mod quality;
pub mod source;
pub mod status;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use controller::PlaybackController;
