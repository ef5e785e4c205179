//! Adaptive-streaming engine collaborator.
//!
//! The engine owns manifest parsing, segment fetching and bitrate adaptation.
//! The controller only loads a source, attaches the media element, reads the
//! parsed levels and steers the current level.

use anyhow::Result;

use crate::media::MediaId;

/// One rendition reported by the engine after manifest parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineLevel {
    /// Display height in pixels.
    pub height: u32,
}

/// Callback fired once the engine has parsed the manifest.
pub type ManifestParsedCallback = Box<dyn Fn(&[EngineLevel]) + Send + Sync>;

/// Live engine instance bound to one media element and one manifest.
pub trait StreamingEngine: Send {
    fn load_source(&mut self, url: &str) -> Result<()>;

    fn attach_media(&mut self, media: MediaId) -> Result<()>;

    /// Subscribe to manifest-parsed notifications.
    fn on_manifest_parsed(&mut self, callback: ManifestParsedCallback);

    /// Levels in engine order; index in this list is the level index.
    fn levels(&self) -> Vec<EngineLevel>;

    /// Current level control; `-1` means automatic.
    fn current_level(&self) -> i32;

    fn set_current_level(&mut self, index: i32);

    /// Release every resource held by the engine.
    fn destroy(&mut self);
}

/// Creates engine handles and reports whether the platform can run one.
pub trait EngineFactory: Send {
    type Engine: StreamingEngine;

    fn is_supported(&self) -> bool;

    fn create(&self) -> Result<Self::Engine>;
}
