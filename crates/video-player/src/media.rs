//! Media element and document abstractions.
//!
//! `MediaElement` is the playback surface the controller mirrors; it is the
//! source of truth for paused state, time, and volume. `DocumentHost` is the
//! page-level owner of fullscreen and picture-in-picture targets.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use video_stream_types::TrackMode;

use crate::listeners::ListenerId;

/// Identity of a media element, used when attaching a streaming engine and
/// when asking the document which element holds a display target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MediaId(pub u64);

/// Identity of a caption track attached to a media element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(pub u64);

/// Media events the controller subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaEventKind {
    Play,
    Pause,
    TimeUpdate,
}

/// Event payload delivered to media listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    /// Periodic position report. `duration` is `NaN` while unknown.
    TimeUpdate { current_time: f64, duration: f64 },
}

impl MediaEvent {
    pub fn kind(&self) -> MediaEventKind {
        match self {
            MediaEvent::Play => MediaEventKind::Play,
            MediaEvent::Pause => MediaEventKind::Pause,
            MediaEvent::TimeUpdate { .. } => MediaEventKind::TimeUpdate,
        }
    }
}

/// Callback invoked for each matching media event.
pub type MediaListener = Arc<dyn Fn(&MediaEvent) + Send + Sync>;

/// Kind of text track attached to the element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextTrackKind {
    Subtitles,
    Captions,
}

/// Description of a caption track to attach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextTrackSpec {
    /// WebVTT resource locator.
    pub src: String,
    pub kind: TextTrackKind,
    pub srclang: String,
    pub label: String,
    /// Marks the track as the default selection.
    pub default: bool,
}

/// Playback surface driven by the controller.
#[async_trait]
pub trait MediaElement: Send {
    fn id(&self) -> MediaId;

    // -- transport --

    fn paused(&self) -> bool;

    /// Start playback. Hosts may reject (autoplay policy, no source).
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    // -- timing --

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Media duration in seconds; `NaN` while unknown.
    fn duration(&self) -> f64;

    // -- volume --

    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    // -- source --

    /// Assign a directly playable resource.
    fn set_src(&mut self, url: &str);

    // -- text tracks --

    fn add_text_track(&mut self, spec: TextTrackSpec) -> TrackId;

    fn remove_text_track(&mut self, id: TrackId) -> bool;

    /// Every text track currently attached, in element order.
    fn text_tracks(&self) -> Vec<TrackId>;

    fn text_track_mode(&self, id: TrackId) -> Option<TrackMode>;

    fn set_text_track_mode(&mut self, id: TrackId, mode: TrackMode);

    // -- events --

    fn add_event_listener(&mut self, kind: MediaEventKind, listener: MediaListener) -> ListenerId;

    /// Detach the registration identified by `id`.
    fn remove_event_listener(&mut self, id: ListenerId) -> bool;

    // -- display targets --

    async fn request_fullscreen(&mut self) -> Result<()>;

    async fn request_picture_in_picture(&mut self) -> Result<()>;
}

/// Page-level owner of fullscreen and picture-in-picture targets.
#[async_trait]
pub trait DocumentHost: Send {
    /// Element currently shown fullscreen, if any.
    fn fullscreen_element(&self) -> Option<MediaId>;

    async fn exit_fullscreen(&mut self) -> Result<()>;

    /// Element currently shown picture-in-picture, if any.
    fn picture_in_picture_element(&self) -> Option<MediaId>;

    async fn exit_picture_in_picture(&mut self) -> Result<()>;
}
