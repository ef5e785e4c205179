//! Playback controller.
//!
//! Single authority over one media element and the optional streaming engine
//! attached to it. User intent goes in through the methods below; media events
//! come back through listeners registered on mount and update the shared
//! [`PlaybackState`] mirror.
//!
//! A mount is everything created by [`PlaybackController::initialize`]: the
//! engine handle (manifest sources only), the play/pause/timeupdate listeners
//! and the caption track. [`PlaybackController::teardown`] removes all of it at
//! once. Every mount bumps a generation counter; callbacks registered by an
//! older mount see a different generation and do nothing.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use video_stream_types::{PlaybackSnapshot, QualityOption, SourceKind, TrackMode};

use crate::config::PlayerConfig;
use crate::engine::{EngineFactory, EngineLevel, StreamingEngine};
use crate::listeners::ListenerId;
use crate::media::{
    DocumentHost, MediaElement, MediaEvent, MediaEventKind, MediaListener, TextTrackKind,
    TextTrackSpec, TrackId,
};
use crate::quality::quality_options;
use crate::source::classify_source;
use crate::status::PlaybackState;

const MIRRORED_EVENTS: [MediaEventKind; 3] = [
    MediaEventKind::Play,
    MediaEventKind::Pause,
    MediaEventKind::TimeUpdate,
];

/// Resources owned by the current mount.
struct Mount {
    source_url: String,
    generation: u64,
    listeners: Vec<ListenerId>,
    caption_track: Option<TrackId>,
}

/// Owns a media element, its document, and at most one engine handle.
pub struct PlaybackController<M, D, F>
where
    M: MediaElement,
    D: DocumentHost,
    F: EngineFactory,
{
    config: PlayerConfig,
    media: M,
    document: D,
    factory: F,
    engine: Option<F::Engine>,
    mount: Option<Mount>,
    state: Arc<Mutex<PlaybackState>>,
}

impl<M, D, F> PlaybackController<M, D, F>
where
    M: MediaElement,
    D: DocumentHost,
    F: EngineFactory,
{
    /// Create an unmounted controller.
    pub fn new(config: PlayerConfig, media: M, document: D, factory: F) -> Self {
        let state = PlaybackState::shared(config.subtitles_visible);
        Self {
            config,
            media,
            document,
            factory,
            engine: None,
            mount: None,
            state,
        }
    }

    /// Mount `source_url` with an optional caption track.
    ///
    /// Tears down any previous mount first. Manifest sources go through a new
    /// engine handle when the platform supports one; everything else, and any
    /// manifest whose engine fails to come up, is assigned straight to the
    /// media element. Returns the path taken.
    pub fn initialize(&mut self, source_url: &str, subtitle_url: Option<&str>) -> SourceKind {
        self.teardown();

        let is_playing = !self.media.paused();
        let volume = self.media.volume();
        let (generation, subtitles_visible) = match self.state.lock() {
            Ok(mut s) => (s.begin_mount(source_url, is_playing, volume), s.subtitles_visible),
            Err(_) => (0, self.config.subtitles_visible),
        };

        let listeners = self.register_listeners(generation);
        let caption_track =
            subtitle_url.map(|url| self.attach_caption_track(url, subtitles_visible));

        let requested = classify_source(source_url, &self.config.manifest_suffix);
        let kind = match requested {
            SourceKind::Manifest if self.factory.is_supported() => {
                match self.start_engine(source_url, generation) {
                    Ok(engine) => {
                        self.engine = Some(engine);
                        SourceKind::Manifest
                    }
                    Err(err) => {
                        tracing::warn!(
                            source = %source_url,
                            error = %format!("{err:#}"),
                            "streaming engine unavailable; assigning source directly"
                        );
                        self.media.set_src(source_url);
                        SourceKind::Direct
                    }
                }
            }
            _ => {
                self.media.set_src(source_url);
                SourceKind::Direct
            }
        };

        self.update_state(|s| s.source_kind = Some(kind));
        self.mount = Some(Mount {
            source_url: source_url.to_string(),
            generation,
            listeners,
            caption_track,
        });
        tracing::debug!(
            source = %source_url,
            kind = ?kind,
            generation,
            "player mounted"
        );
        kind
    }

    /// Destroy the engine, detach listeners and remove the caption track.
    ///
    /// Safe to call any number of times; also runs on drop.
    pub fn teardown(&mut self) {
        let Some(mount) = self.mount.take() else {
            return;
        };
        self.update_state(PlaybackState::end_mount);

        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        for id in mount.listeners {
            if !self.media.remove_event_listener(id) {
                tracing::debug!(listener = id.get(), "media listener already detached");
            }
        }
        if let Some(track) = mount.caption_track {
            self.media.remove_text_track(track);
        }
        tracing::debug!(
            source = %mount.source_url,
            generation = mount.generation,
            "player unmounted"
        );
    }

    /// Request the rendition at `level_index`; `-1` selects automatic mode.
    ///
    /// Without an engine (direct sources) only the selection is recorded.
    pub fn set_quality(&mut self, level_index: i32) {
        self.update_state(|s| s.selected_quality_index = level_index);
        match self.engine.as_mut() {
            Some(engine) => {
                let known = engine.levels().len();
                if level_index >= 0 && level_index as usize >= known {
                    tracing::warn!(level_index, known, "quality level not reported by the engine");
                }
                engine.set_current_level(level_index);
            }
            None => tracing::debug!(level_index, "no streaming engine; quality selection recorded only"),
        }
    }

    /// Play when the element is paused, pause otherwise.
    ///
    /// Decides from the element's own paused flag and leaves the mirror equal
    /// to it, so a stale mirror is corrected by the call. Returns whether the
    /// element is playing afterwards.
    pub fn toggle_playback(&mut self) -> bool {
        if self.media.paused() {
            if let Err(err) = self.media.play() {
                tracing::warn!(error = %err, "play request rejected");
            }
        } else {
            self.media.pause();
        }
        let playing = !self.media.paused();
        self.update_state(|s| s.is_playing = playing);
        playing
    }

    /// Show every caption track when hidden, hide every one when shown.
    ///
    /// Every track gets the same mode, so a track that started `Disabled`
    /// comes back as `Showing` after two calls. Returns the new visibility.
    pub fn toggle_subtitles(&mut self) -> bool {
        let visible = self.with_state(|s| s.subtitles_visible).unwrap_or(true);
        let mode = if visible {
            TrackMode::Hidden
        } else {
            TrackMode::Showing
        };
        for track in self.media.text_tracks() {
            self.media.set_text_track_mode(track, mode);
        }
        self.update_state(|s| s.subtitles_visible = !visible);
        !visible
    }

    /// Seek to `percent` of the duration.
    ///
    /// Returns `false` and leaves the element untouched while the duration is
    /// unknown or `percent` is not a number. Values outside `[0, 100]` are
    /// clamped.
    pub fn seek_to(&mut self, percent: f64) -> bool {
        let duration = self.media.duration();
        if !duration.is_finite() || duration <= 0.0 {
            tracing::debug!(percent, "seek ignored; duration unknown");
            return false;
        }
        if percent.is_nan() {
            return false;
        }
        let percent = percent.clamp(0.0, 100.0);
        self.media.set_current_time(percent / 100.0 * duration);
        self.update_state(|s| s.progress_percent = percent);
        true
    }

    /// Assign the element volume as given; range checking is up to the caller.
    pub fn set_volume(&mut self, level: f64) {
        self.media.set_volume(level);
        let volume = self.media.volume();
        self.update_state(|s| s.volume = volume);
    }

    /// Enter fullscreen on the media element, or leave it when the document
    /// already has a fullscreen element.
    ///
    /// The mirror only changes once the request resolved. Returns the
    /// fullscreen flag after the call.
    pub async fn toggle_fullscreen(&mut self) -> Result<bool> {
        let active = self.document.fullscreen_element().is_some();
        if active {
            self.document
                .exit_fullscreen()
                .await
                .context("exit fullscreen")?;
        } else {
            self.media
                .request_fullscreen()
                .await
                .context("request fullscreen")?;
        }
        self.update_state(|s| s.is_fullscreen = !active);
        Ok(!active)
    }

    /// Enter picture-in-picture, or leave it when the document already has a
    /// picture-in-picture element.
    ///
    /// Failures are logged and leave the mirror unchanged. Returns the
    /// picture-in-picture flag after the call.
    pub async fn toggle_picture_in_picture(&mut self) -> bool {
        let active = self.document.picture_in_picture_element().is_some();
        let result = if active {
            self.document.exit_picture_in_picture().await
        } else {
            self.media.request_picture_in_picture().await
        };
        match result {
            Ok(()) => {
                self.update_state(|s| s.is_picture_in_picture = !active);
                !active
            }
            Err(err) => {
                tracing::warn!(error = %err, "picture-in-picture request failed");
                self.with_state(|s| s.is_picture_in_picture)
                    .unwrap_or(active)
            }
        }
    }

    /// Copy of the mirrored state.
    pub fn state(&self) -> PlaybackState {
        self.sync_display_targets();
        self.with_state(|s| s.clone()).unwrap_or_default()
    }

    /// Serializable snapshot of the mirrored state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.sync_display_targets();
        self.with_state(|s| s.snapshot()).unwrap_or_else(|| {
            PlaybackState::default().snapshot()
        })
    }

    /// Level the engine is currently playing or targeting; `-1` is automatic.
    ///
    /// `None` without an engine.
    pub fn active_level(&self) -> Option<i32> {
        self.engine.as_ref().map(|engine| engine.current_level())
    }

    /// Mode of the caption track attached by the current mount.
    pub fn caption_mode(&self) -> Option<TrackMode> {
        let track = self.mount.as_ref()?.caption_track?;
        self.media.text_track_mode(track)
    }

    /// Quality menu of the current mount.
    pub fn quality_levels(&self) -> Vec<QualityOption> {
        self.with_state(|s| s.quality_levels.clone())
            .unwrap_or_default()
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// The live engine handle, if the current mount has one.
    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    fn register_listeners(&mut self, generation: u64) -> Vec<ListenerId> {
        MIRRORED_EVENTS
            .into_iter()
            .map(|kind| {
                let state = Arc::clone(&self.state);
                let listener: MediaListener = Arc::new(move |event: &MediaEvent| {
                    if let Ok(mut s) = state.lock() {
                        if s.generation == generation {
                            s.apply_media_event(event);
                        }
                    }
                });
                self.media.add_event_listener(kind, listener)
            })
            .collect()
    }

    fn attach_caption_track(&mut self, url: &str, visible: bool) -> TrackId {
        let track = self.media.add_text_track(TextTrackSpec {
            src: url.to_string(),
            kind: TextTrackKind::Subtitles,
            srclang: self.config.caption_language.clone(),
            label: self.config.caption_label.clone(),
            default: true,
        });
        let mode = if visible {
            TrackMode::Showing
        } else {
            TrackMode::Hidden
        };
        self.media.set_text_track_mode(track, mode);
        track
    }

    /// Create, wire and attach an engine for `source_url`.
    ///
    /// A handle that fails part-way is destroyed before the error is returned.
    fn start_engine(&mut self, source_url: &str, generation: u64) -> Result<F::Engine> {
        let mut engine = self.factory.create().context("create streaming engine")?;

        let state = Arc::clone(&self.state);
        engine.on_manifest_parsed(Box::new(move |levels: &[EngineLevel]| {
            if let Ok(mut s) = state.lock() {
                if s.generation == generation {
                    s.quality_levels = quality_options(levels);
                    tracing::debug!(levels = levels.len(), "manifest parsed");
                }
            }
        }));

        let wired = engine
            .load_source(source_url)
            .with_context(|| format!("load source {source_url}"))
            .and_then(|()| {
                engine
                    .attach_media(self.media.id())
                    .context("attach media element")
            });
        match wired {
            Ok(()) => Ok(engine),
            Err(err) => {
                engine.destroy();
                Err(err)
            }
        }
    }

    /// Re-read fullscreen and picture-in-picture ownership from the document.
    ///
    /// The document can release either target on its own (Esc, closing the
    /// PiP window), so the flags follow whichever element it reports.
    fn sync_display_targets(&self) {
        let id = self.media.id();
        let fullscreen = self.document.fullscreen_element() == Some(id);
        let picture_in_picture = self.document.picture_in_picture_element() == Some(id);
        self.update_state(|s| {
            s.is_fullscreen = fullscreen;
            s.is_picture_in_picture = picture_in_picture;
        });
    }

    fn with_state<R>(&self, f: impl FnOnce(&PlaybackState) -> R) -> Option<R> {
        self.state.lock().ok().map(|s| f(&s))
    }

    fn update_state(&self, f: impl FnOnce(&mut PlaybackState)) {
        if let Ok(mut s) = self.state.lock() {
            f(&mut s);
        }
    }
}

impl<M, D, F> Drop for PlaybackController<M, D, F>
where
    M: MediaElement,
    D: DocumentHost,
    F: EngineFactory,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
