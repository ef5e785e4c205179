//! In-memory collaborators for tests.
//!
//! Handles are cheap clones over shared state so a test can keep one copy
//! while the controller owns another.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use video_stream_types::TrackMode;

use crate::engine::{EngineFactory, EngineLevel, ManifestParsedCallback, StreamingEngine};
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::media::{
    DocumentHost, MediaElement, MediaEvent, MediaEventKind, MediaId, MediaListener, TextTrackSpec,
    TrackId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct DomState {
    next_media_id: u64,
    fullscreen: Option<MediaId>,
    picture_in_picture: Option<MediaId>,
    fullscreen_error: Option<String>,
    picture_in_picture_error: Option<String>,
}

/// Document double owning fullscreen and picture-in-picture targets.
#[derive(Clone, Default)]
pub struct MockDocument {
    dom: Arc<Mutex<DomState>>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every fullscreen request and exit fail with `message`.
    pub fn fail_fullscreen(&self, message: Option<&str>) {
        lock(&self.dom).fullscreen_error = message.map(str::to_string);
    }

    /// Make every picture-in-picture request and exit fail with `message`.
    pub fn fail_picture_in_picture(&self, message: Option<&str>) {
        lock(&self.dom).picture_in_picture_error = message.map(str::to_string);
    }

    /// Put `media` in fullscreen without going through the controller.
    pub fn set_fullscreen_element(&self, media: Option<MediaId>) {
        lock(&self.dom).fullscreen = media;
    }

    pub fn set_picture_in_picture_element(&self, media: Option<MediaId>) {
        lock(&self.dom).picture_in_picture = media;
    }
}

#[async_trait]
impl DocumentHost for MockDocument {
    fn fullscreen_element(&self) -> Option<MediaId> {
        lock(&self.dom).fullscreen
    }

    async fn exit_fullscreen(&mut self) -> Result<()> {
        let mut dom = lock(&self.dom);
        if let Some(message) = dom.fullscreen_error.clone() {
            return Err(anyhow!(message));
        }
        dom.fullscreen = None;
        Ok(())
    }

    fn picture_in_picture_element(&self) -> Option<MediaId> {
        lock(&self.dom).picture_in_picture
    }

    async fn exit_picture_in_picture(&mut self) -> Result<()> {
        let mut dom = lock(&self.dom);
        if let Some(message) = dom.picture_in_picture_error.clone() {
            return Err(anyhow!(message));
        }
        dom.picture_in_picture = None;
        Ok(())
    }
}

struct MockTrack {
    id: TrackId,
    spec: TextTrackSpec,
    mode: TrackMode,
}

struct MediaState {
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    src: Option<String>,
    reject_play: bool,
    next_track_id: u64,
    tracks: Vec<MockTrack>,
    listeners: ListenerRegistry<MediaEventKind, MediaListener>,
}

/// Media element double.
///
/// `play`/`pause` dispatch the matching event synchronously, the way a
/// listener would observe them on the next tick.
#[derive(Clone)]
pub struct MockMediaElement {
    id: MediaId,
    inner: Arc<Mutex<MediaState>>,
    dom: Arc<Mutex<DomState>>,
}

impl MockMediaElement {
    /// Create an element living in `document`.
    pub fn new(document: &MockDocument) -> Self {
        let id = {
            let mut dom = lock(&document.dom);
            dom.next_media_id += 1;
            MediaId(dom.next_media_id)
        };
        Self {
            id,
            inner: Arc::new(Mutex::new(MediaState {
                paused: true,
                current_time: 0.0,
                duration: f64::NAN,
                volume: 1.0,
                src: None,
                reject_play: false,
                next_track_id: 0,
                tracks: Vec::new(),
                listeners: ListenerRegistry::new(),
            })),
            dom: Arc::clone(&document.dom),
        }
    }

    /// Deliver `event` to matching listeners in registration order.
    pub fn emit(&self, event: MediaEvent) {
        let listeners: Vec<MediaListener> = lock(&self.inner)
            .listeners
            .for_kind(event.kind())
            .cloned()
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Emit a `TimeUpdate` carrying the current position and duration.
    pub fn emit_time_update(&self) {
        let (current_time, duration) = {
            let inner = lock(&self.inner);
            (inner.current_time, inner.duration)
        };
        self.emit(MediaEvent::TimeUpdate {
            current_time,
            duration,
        });
    }

    pub fn set_duration(&self, duration: f64) {
        lock(&self.inner).duration = duration;
    }

    /// Flip the paused flag without emitting events, as a host might while
    /// buffering or after an external control.
    pub fn force_paused(&self, paused: bool) {
        lock(&self.inner).paused = paused;
    }

    /// Reject subsequent `play` calls.
    pub fn reject_play(&self, reject: bool) {
        lock(&self.inner).reject_play = reject;
    }

    pub fn src(&self) -> Option<String> {
        lock(&self.inner).src.clone()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    pub fn listener_count_for(&self, kind: MediaEventKind) -> usize {
        lock(&self.inner).listeners.count(kind)
    }

    pub fn track_specs(&self) -> Vec<TextTrackSpec> {
        lock(&self.inner)
            .tracks
            .iter()
            .map(|track| track.spec.clone())
            .collect()
    }

    pub fn track_modes(&self) -> Vec<TrackMode> {
        lock(&self.inner)
            .tracks
            .iter()
            .map(|track| track.mode)
            .collect()
    }

    /// Attach a track outside the controller (for example from page markup).
    pub fn push_track(&self, spec: TextTrackSpec, mode: TrackMode) -> TrackId {
        let mut inner = lock(&self.inner);
        inner.next_track_id += 1;
        let id = TrackId(inner.next_track_id);
        inner.tracks.push(MockTrack { id, spec, mode });
        id
    }
}

#[async_trait]
impl MediaElement for MockMediaElement {
    fn id(&self) -> MediaId {
        self.id
    }

    fn paused(&self) -> bool {
        lock(&self.inner).paused
    }

    fn play(&mut self) -> Result<()> {
        {
            let mut inner = lock(&self.inner);
            if inner.reject_play {
                return Err(anyhow!("play() request was rejected"));
            }
            inner.paused = false;
        }
        self.emit(MediaEvent::Play);
        Ok(())
    }

    fn pause(&mut self) {
        lock(&self.inner).paused = true;
        self.emit(MediaEvent::Pause);
    }

    fn current_time(&self) -> f64 {
        lock(&self.inner).current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        lock(&self.inner).current_time = seconds;
    }

    fn duration(&self) -> f64 {
        lock(&self.inner).duration
    }

    fn volume(&self) -> f64 {
        lock(&self.inner).volume
    }

    fn set_volume(&mut self, volume: f64) {
        lock(&self.inner).volume = volume;
    }

    fn set_src(&mut self, url: &str) {
        lock(&self.inner).src = Some(url.to_string());
    }

    fn add_text_track(&mut self, spec: TextTrackSpec) -> TrackId {
        let mode = if spec.default {
            TrackMode::Showing
        } else {
            TrackMode::Disabled
        };
        self.push_track(spec, mode)
    }

    fn remove_text_track(&mut self, id: TrackId) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.tracks.len();
        inner.tracks.retain(|track| track.id != id);
        inner.tracks.len() != before
    }

    fn text_tracks(&self) -> Vec<TrackId> {
        lock(&self.inner).tracks.iter().map(|track| track.id).collect()
    }

    fn text_track_mode(&self, id: TrackId) -> Option<TrackMode> {
        lock(&self.inner)
            .tracks
            .iter()
            .find(|track| track.id == id)
            .map(|track| track.mode)
    }

    fn set_text_track_mode(&mut self, id: TrackId, mode: TrackMode) {
        if let Some(track) = lock(&self.inner).tracks.iter_mut().find(|track| track.id == id) {
            track.mode = mode;
        }
    }

    fn add_event_listener(&mut self, kind: MediaEventKind, listener: MediaListener) -> ListenerId {
        lock(&self.inner).listeners.add(kind, listener)
    }

    fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        lock(&self.inner).listeners.remove(id)
    }

    async fn request_fullscreen(&mut self) -> Result<()> {
        let mut dom = lock(&self.dom);
        if let Some(message) = dom.fullscreen_error.clone() {
            return Err(anyhow!(message));
        }
        dom.fullscreen = Some(self.id);
        Ok(())
    }

    async fn request_picture_in_picture(&mut self) -> Result<()> {
        let mut dom = lock(&self.dom);
        if let Some(message) = dom.picture_in_picture_error.clone() {
            return Err(anyhow!(message));
        }
        dom.picture_in_picture = Some(self.id);
        Ok(())
    }
}

/// Observable state of one engine created by [`MockEngineFactory`].
#[derive(Default)]
pub struct MockEngineState {
    pub source: Option<String>,
    pub attached: Option<MediaId>,
    pub levels: Vec<EngineLevel>,
    pub current_level: i32,
    /// Every value written to the current-level control.
    pub level_requests: Vec<i32>,
    pub destroyed: bool,
    callbacks: Vec<ManifestParsedCallback>,
}

impl MockEngineState {
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }
}

pub struct MockEngine {
    state: Arc<Mutex<MockEngineState>>,
    fail_attach: bool,
}

impl StreamingEngine for MockEngine {
    fn load_source(&mut self, url: &str) -> Result<()> {
        lock(&self.state).source = Some(url.to_string());
        Ok(())
    }

    fn attach_media(&mut self, media: MediaId) -> Result<()> {
        if self.fail_attach {
            return Err(anyhow!("media attach failed"));
        }
        lock(&self.state).attached = Some(media);
        Ok(())
    }

    fn on_manifest_parsed(&mut self, callback: ManifestParsedCallback) {
        lock(&self.state).callbacks.push(callback);
    }

    fn levels(&self) -> Vec<EngineLevel> {
        lock(&self.state).levels.clone()
    }

    fn current_level(&self) -> i32 {
        lock(&self.state).current_level
    }

    fn set_current_level(&mut self, index: i32) {
        let mut state = lock(&self.state);
        state.current_level = index;
        state.level_requests.push(index);
    }

    fn destroy(&mut self) {
        let mut state = lock(&self.state);
        state.destroyed = true;
        state.attached = None;
    }
}

#[derive(Default)]
struct FactoryState {
    unsupported: bool,
    fail_create: bool,
    fail_attach: bool,
    engines: Vec<Arc<Mutex<MockEngineState>>>,
}

/// Engine factory double that records every engine it hands out.
#[derive(Clone, Default)]
pub struct MockEngineFactory {
    inner: Arc<Mutex<FactoryState>>,
}

impl MockEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the platform as unable to run an engine.
    pub fn set_supported(&self, supported: bool) {
        lock(&self.inner).unsupported = !supported;
    }

    pub fn fail_create(&self, fail: bool) {
        lock(&self.inner).fail_create = fail;
    }

    /// Engines created from now on fail to attach the media element.
    pub fn fail_attach(&self, fail: bool) {
        lock(&self.inner).fail_attach = fail;
    }

    pub fn created_count(&self) -> usize {
        lock(&self.inner).engines.len()
    }

    /// Engines created and not yet destroyed.
    pub fn live_count(&self) -> usize {
        lock(&self.inner)
            .engines
            .iter()
            .filter(|engine| !lock(engine).destroyed)
            .count()
    }

    /// Inspect the engine created `index`-th.
    pub fn with_engine<R>(&self, index: usize, f: impl FnOnce(&MockEngineState) -> R) -> Option<R> {
        let engine = lock(&self.inner).engines.get(index).cloned()?;
        let state = lock(&engine);
        Some(f(&state))
    }

    /// Report the manifest parsed on the engine created `index`-th, whether
    /// or not it has been destroyed since.
    pub fn emit_manifest_parsed(&self, index: usize, heights: &[u32]) {
        let Some(engine) = lock(&self.inner).engines.get(index).cloned() else {
            return;
        };
        let mut state = lock(&engine);
        state.levels = heights
            .iter()
            .map(|&height| EngineLevel { height })
            .collect();
        let levels = state.levels.clone();
        for callback in &state.callbacks {
            callback(&levels);
        }
    }

    /// Report the manifest parsed on the most recently created engine.
    pub fn emit_manifest_parsed_latest(&self, heights: &[u32]) {
        let count = self.created_count();
        if count > 0 {
            self.emit_manifest_parsed(count - 1, heights);
        }
    }
}

impl EngineFactory for MockEngineFactory {
    type Engine = MockEngine;

    fn is_supported(&self) -> bool {
        !lock(&self.inner).unsupported
    }

    fn create(&self) -> Result<MockEngine> {
        let mut inner = lock(&self.inner);
        if inner.fail_create {
            return Err(anyhow!("engine construction failed"));
        }
        let state = Arc::new(Mutex::new(MockEngineState {
            current_level: -1,
            ..MockEngineState::default()
        }));
        inner.engines.push(Arc::clone(&state));
        Ok(MockEngine {
            state,
            fail_attach: inner.fail_attach,
        })
    }
}
