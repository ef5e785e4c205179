use std::sync::{Arc, Mutex};

use video_stream_types::{AUTO_LEVEL_INDEX, PlaybackSnapshot, QualityOption, SourceKind};

use crate::media::MediaEvent;

/// Mirrored player state, shared between the controller and its listeners.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Source of the current mount.
    pub source_url: Option<String>,
    /// Path the current mount took.
    pub source_kind: Option<SourceKind>,
    /// `true` while the media element reports it is not paused.
    pub is_playing: bool,
    /// Volume as last read back from the media element.
    pub volume: f64,
    /// Progress in percent, always within `[0, 100]`.
    pub progress_percent: f64,
    /// `true` while the document reports this element as its fullscreen
    /// element.
    pub is_fullscreen: bool,
    /// Same as `is_fullscreen` for the picture-in-picture target.
    pub is_picture_in_picture: bool,
    /// Global caption visibility applied to every track.
    pub subtitles_visible: bool,
    /// Requested level index; `-1` means automatic.
    pub selected_quality_index: i32,
    /// Quality menu, empty until the engine reports the manifest parsed.
    pub quality_levels: Vec<QualityOption>,
    /// Mount counter. Callbacks carry the value they were registered with and
    /// are dropped once it changes.
    pub(crate) generation: u64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            source_url: None,
            source_kind: None,
            is_playing: false,
            volume: 1.0,
            progress_percent: 0.0,
            is_fullscreen: false,
            is_picture_in_picture: false,
            subtitles_visible: true,
            selected_quality_index: AUTO_LEVEL_INDEX,
            quality_levels: Vec::new(),
            generation: 0,
        }
    }
}

impl PlaybackState {
    /// Create a shared, mutex-protected state.
    pub fn shared(subtitles_visible: bool) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self {
            subtitles_visible,
            ..Self::default()
        }))
    }

    /// Return a serializable snapshot.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            source_url: self.source_url.clone(),
            source_kind: self.source_kind,
            is_playing: self.is_playing,
            volume: self.volume,
            progress_percent: self.progress_percent,
            is_fullscreen: self.is_fullscreen,
            is_picture_in_picture: self.is_picture_in_picture,
            subtitles_visible: self.subtitles_visible,
            selected_quality_index: self.selected_quality_index,
            quality_levels: self.quality_levels.clone(),
        }
    }

    /// Current mount generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fold a media event into the mirrored fields.
    pub fn apply_media_event(&mut self, event: &MediaEvent) {
        match *event {
            MediaEvent::Play => self.is_playing = true,
            MediaEvent::Pause => self.is_playing = false,
            MediaEvent::TimeUpdate {
                current_time,
                duration,
            } => self.progress_percent = progress_percent(current_time, duration),
        }
    }

    /// Start a new mount and return its generation.
    pub(crate) fn begin_mount(&mut self, source_url: &str, is_playing: bool, volume: f64) -> u64 {
        self.generation += 1;
        self.source_url = Some(source_url.to_string());
        self.source_kind = None;
        self.is_playing = is_playing;
        self.volume = volume;
        self.progress_percent = 0.0;
        self.selected_quality_index = AUTO_LEVEL_INDEX;
        self.quality_levels.clear();
        self.generation
    }

    /// Invalidate callbacks of the current mount and clear mount-scoped fields.
    ///
    /// Display flags, volume and caption visibility belong to the player,
    /// not the mount, and are kept.
    pub(crate) fn end_mount(&mut self) {
        self.generation += 1;
        self.source_url = None;
        self.source_kind = None;
        self.progress_percent = 0.0;
        self.selected_quality_index = AUTO_LEVEL_INDEX;
        self.quality_levels.clear();
    }
}

/// Progress in percent for `current_time` of `duration`.
///
/// Unknown, non-finite or non-positive durations yield `0`.
pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_ratio_of_duration() {
        assert!((progress_percent(30.0, 120.0) - 25.0).abs() < 1e-9);
        assert_eq!(progress_percent(0.0, 10.0), 0.0);
        assert_eq!(progress_percent(10.0, 10.0), 100.0);
    }

    #[test]
    fn progress_is_zero_for_unknown_duration() {
        assert_eq!(progress_percent(5.0, f64::NAN), 0.0);
        assert_eq!(progress_percent(5.0, f64::INFINITY), 0.0);
        assert_eq!(progress_percent(5.0, 0.0), 0.0);
        assert_eq!(progress_percent(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_percent(15.0, 10.0), 100.0);
        assert_eq!(progress_percent(-1.0, 10.0), 0.0);
    }

    #[test]
    fn media_events_update_mirror() {
        let mut state = PlaybackState::default();
        state.apply_media_event(&MediaEvent::Play);
        assert!(state.is_playing);
        state.apply_media_event(&MediaEvent::TimeUpdate {
            current_time: 5.0,
            duration: 20.0,
        });
        assert!((state.progress_percent - 25.0).abs() < 1e-9);
        state.apply_media_event(&MediaEvent::Pause);
        assert!(!state.is_playing);
    }

    #[test]
    fn end_mount_clears_mount_fields_and_bumps_generation() {
        let mut state = PlaybackState::default();
        let generation = state.begin_mount("stream.m3u8", false, 0.5);
        state.quality_levels.push(QualityOption::auto());
        state.selected_quality_index = 2;
        state.progress_percent = 40.0;
        state.is_fullscreen = true;

        state.end_mount();

        assert!(state.generation() > generation);
        assert!(state.source_url.is_none());
        assert!(state.quality_levels.is_empty());
        assert_eq!(state.selected_quality_index, -1);
        assert_eq!(state.progress_percent, 0.0);
        assert!(state.is_fullscreen);
        assert_eq!(state.volume, 0.5);
    }

    #[test]
    fn snapshot_copies_fields() {
        let mut state = PlaybackState::default();
        state.begin_mount("clip.mp4", true, 0.3);
        state.source_kind = Some(SourceKind::Direct);

        let snap = state.snapshot();
        assert_eq!(snap.source_url.as_deref(), Some("clip.mp4"));
        assert_eq!(snap.source_kind, Some(SourceKind::Direct));
        assert!(snap.is_playing);
        assert_eq!(snap.volume, 0.3);
        assert!(snap.subtitles_visible);
        assert_eq!(snap.selected_quality_index, -1);
    }
}
