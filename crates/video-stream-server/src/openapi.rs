use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
    ),
    components(
        schemas(
            api::HealthResponse,
            api::ErrorResponse,
            video_stream_types::PlaybackSnapshot,
            video_stream_types::QualityOption,
            video_stream_types::SourceKind,
            video_stream_types::TrackMode,
        )
    ),
    tags(
        (name = "video-stream-server", description = "Video streaming backend API")
    )
)]
pub struct ApiDoc;
