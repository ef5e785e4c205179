//! Control bar view-model.
//!
//! Converts mirrored player state into render-ready labels and slider ranges
//! so toolkit code stays layout-focused.

use crate::status::PlaybackState;

/// Range input description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderView {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

/// One `<option>`-style entry of the quality selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualityEntryView {
    pub level_index: i32,
    pub text: String,
}

/// Everything a host needs to draw the player controls.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlBarView {
    pub progress: SliderView,
    pub volume: SliderView,
    pub play_label: &'static str,
    pub fullscreen_label: &'static str,
    pub picture_in_picture_label: &'static str,
    pub subtitles_label: &'static str,
    pub quality_entries: Vec<QualityEntryView>,
    pub selected_quality_index: i32,
}

impl ControlBarView {
    pub fn from_state(state: &PlaybackState) -> Self {
        let quality_entries = state
            .quality_levels
            .iter()
            .map(|option| QualityEntryView {
                level_index: option.level_index,
                text: option.display_name(),
            })
            .collect();
        Self {
            progress: SliderView {
                min: 0.0,
                max: 100.0,
                step: 0.1,
                value: state.progress_percent,
            },
            volume: SliderView {
                min: 0.0,
                max: 1.0,
                step: 0.1,
                value: state.volume,
            },
            play_label: if state.is_playing { "Pause" } else { "Play" },
            fullscreen_label: if state.is_fullscreen {
                "Exit Fullscreen"
            } else {
                "Fullscreen"
            },
            picture_in_picture_label: if state.is_picture_in_picture {
                "Exit PiP"
            } else {
                "Picture-in-Picture"
            },
            subtitles_label: if state.subtitles_visible {
                "Hide Subtitles"
            } else {
                "Show Subtitles"
            },
            quality_entries,
            selected_quality_index: state.selected_quality_index,
        }
    }
}
