use serde::{Deserialize, Serialize};

/// Level index that hands quality selection back to the streaming engine.
pub const AUTO_LEVEL_INDEX: i32 = -1;

/// Label used for the synthetic automatic quality entry.
pub const AUTO_LABEL: &str = "auto";

/// How a media source is fed to the media element.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Adaptive manifest played through a streaming engine handle.
    Manifest,
    /// Plain media file assigned straight to the media element.
    Direct,
}

/// Visibility mode of a caption track.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TrackMode {
    Showing,
    Hidden,
    Disabled,
}

/// One selectable entry of the quality menu.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QualityOption {
    /// `"auto"` for the automatic entry, otherwise the rendition height.
    pub label: String,
    /// Engine level index; `-1` selects automatic mode.
    pub level_index: i32,
}

impl QualityOption {
    /// The synthetic entry that always heads the menu.
    pub fn auto() -> Self {
        Self {
            label: AUTO_LABEL.to_string(),
            level_index: AUTO_LEVEL_INDEX,
        }
    }

    /// Entry for a concrete rendition of the given display height.
    pub fn level(height: u32, level_index: i32) -> Self {
        Self {
            label: height.to_string(),
            level_index,
        }
    }

    /// Returns `true` for the automatic entry.
    pub fn is_auto(&self) -> bool {
        self.level_index == AUTO_LEVEL_INDEX
    }

    /// Human-facing text for menus (`Auto`, `720p`).
    pub fn display_name(&self) -> String {
        if self.is_auto() {
            "Auto".to_string()
        } else {
            format!("{}p", self.label)
        }
    }
}

/// Serializable view of a player's mirrored state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PlaybackSnapshot {
    /// Source currently mounted, if any.
    pub source_url: Option<String>,
    /// Path used to feed the source; `None` before the first mount.
    pub source_kind: Option<SourceKind>,
    /// `true` while the media element is not paused.
    pub is_playing: bool,
    /// Media volume in `[0, 1]` as last read from the element.
    pub volume: f64,
    /// Playback progress in percent, `0` when duration is unknown.
    pub progress_percent: f64,
    pub is_fullscreen: bool,
    pub is_picture_in_picture: bool,
    pub subtitles_visible: bool,
    /// Requested level index; `-1` means automatic.
    pub selected_quality_index: i32,
    /// Quality menu entries, empty until the manifest is parsed.
    pub quality_levels: Vec<QualityOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_option_uses_sentinel_index() {
        let auto = QualityOption::auto();
        assert_eq!(auto.label, "auto");
        assert_eq!(auto.level_index, -1);
        assert!(auto.is_auto());
        assert_eq!(auto.display_name(), "Auto");
    }

    #[test]
    fn level_option_displays_height() {
        let level = QualityOption::level(720, 1);
        assert_eq!(level.label, "720");
        assert!(!level.is_auto());
        assert_eq!(level.display_name(), "720p");
    }

    #[test]
    fn source_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SourceKind::Manifest).unwrap();
        assert_eq!(json, "\"manifest\"");
        let mode: TrackMode = serde_json::from_str("\"hidden\"").unwrap();
        assert_eq!(mode, TrackMode::Hidden);
    }
}
