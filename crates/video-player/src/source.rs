//! Source routing.
//!
//! Decides whether a media URL goes through the streaming engine or straight
//! to the media element. Selection looks at the URL suffix only; the resource
//! is never fetched or sniffed.

use video_stream_types::SourceKind;

/// Classify `url` by its suffix.
pub fn classify_source(url: &str, manifest_suffix: &str) -> SourceKind {
    if !manifest_suffix.is_empty() && url.ends_with(manifest_suffix) {
        SourceKind::Manifest
    } else {
        SourceKind::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_suffix_routes_to_engine() {
        assert_eq!(
            classify_source("https://cdn.example/x36xhzz.m3u8", ".m3u8"),
            SourceKind::Manifest
        );
        assert_eq!(classify_source("stream.m3u8", ".m3u8"), SourceKind::Manifest);
    }

    #[test]
    fn media_files_are_direct() {
        assert_eq!(classify_source("clip.mp4", ".m3u8"), SourceKind::Direct);
        assert_eq!(classify_source("clip.webm", ".m3u8"), SourceKind::Direct);
    }

    #[test]
    fn suffix_match_is_literal() {
        // Query strings and case differences are not normalized.
        assert_eq!(classify_source("stream.m3u8?token=1", ".m3u8"), SourceKind::Direct);
        assert_eq!(classify_source("STREAM.M3U8", ".m3u8"), SourceKind::Direct);
    }

    #[test]
    fn empty_suffix_never_matches() {
        assert_eq!(classify_source("stream.m3u8", ""), SourceKind::Direct);
    }
}
