/// Player settings shared by the controller and the hosts that mount it.
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// Source suffix that routes playback through the streaming engine.
    pub manifest_suffix: String,
    /// BCP-47 language tag of the attached caption track.
    pub caption_language: String,
    /// Display label of the attached caption track.
    pub caption_label: String,
    /// Whether caption tracks start in `Showing` mode.
    pub subtitles_visible: bool,
}

impl Default for PlayerConfig {
    /// HLS manifests, one English caption track shown by default.
    fn default() -> Self {
        Self {
            manifest_suffix: ".m3u8".to_string(),
            caption_language: "en".to_string(),
            caption_label: "English".to_string(),
            subtitles_visible: true,
        }
    }
}
