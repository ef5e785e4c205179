//! Actix server startup + app wiring.
//!
//! Resolves settings, connects the database, then builds the routes,
//! middleware and OpenAPI endpoints. The listener is only bound once the
//! database answered.

use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{Next, from_fn};
use actix_web::{App, Error, HttpServer, web};
use anyhow::Result;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::config;
use crate::db::Database;
use crate::openapi;
use crate::state::AppState;

/// Connect the database and run the HTTP server until shutdown.
pub(crate) async fn run(args: crate::Args) -> Result<()> {
    let cfg = load_config(args.config.as_ref())?;
    let settings = config::resolve(&cfg, args.bind, |key| std::env::var(key).ok())?;

    let db = match Database::connect(&settings.database_uri) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(
                error = %format!("{e:#}"),
                "error connecting the database; server not started"
            );
            return Err(e);
        }
    };
    tracing::info!(path = %db.path().display(), "database connected");

    if settings.allowed_origins.is_empty() {
        tracing::warn!("no allowed origin configured; cross-origin requests will be rejected");
    }
    tracing::info!(
        bind = %settings.bind,
        origins = ?settings.allowed_origins,
        "starting video-stream-server"
    );

    let state = web::Data::new(AppState::new(db));
    setup_shutdown();
    let origins = settings.allowed_origins.clone();
    let json_limit = settings.json_limit;
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(api::json_config(json_limit))
            .wrap(build_cors(&origins))
            .wrap(from_fn(log_requests))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", openapi::ApiDoc::openapi()),
            )
            .service(api::health)
    })
    .bind(settings.bind)?
    .run()
    .await?;

    Ok(())
}

/// CORS policy allowing credentialed requests from `origins`.
///
/// An empty list allows no cross-origin callers; `*` accepts any origin and
/// echoes it back, since a wildcard header cannot carry credentials.
pub(crate) fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);
    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Return true when the request path should be logged.
fn should_log_path(path: &str) -> bool {
    !(path == "/health" || path.starts_with("/swagger-ui/"))
}

/// Log one line per request, skipping health probes and Swagger assets.
async fn log_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if !should_log_path(req.path()) {
        return next.call(req).await;
    }
    let method = req.method().clone();
    let path = req.path().to_string();
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let started = std::time::Instant::now();

    let res = next.call(req).await?;
    tracing::info!(
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        origin = origin.as_deref().unwrap_or("-"),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "http request"
    );
    Ok(res)
}

/// Load server config from `path`, the `config.toml` next to the binary, or
/// fall back to environment-only settings.
fn load_config(path: Option<&PathBuf>) -> Result<config::ServerConfig> {
    if let Some(path) = path {
        return config::ServerConfig::load(path);
    }
    let auto_path = std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join("config.toml")));
    match auto_path {
        Some(path) if path.exists() => config::ServerConfig::load(&path),
        _ => Ok(config::ServerConfig::default()),
    }
}

/// Install Ctrl+C handler that stops the Actix system.
fn setup_shutdown() {
    let _ = ctrlc::set_handler(move || {
        if let Some(system) = actix_web::rt::System::try_current() {
            system.stop();
        } else {
            std::process::exit(0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{Method, StatusCode};
    use actix_web::test;

    #[::core::prelude::v1::test]
    fn health_and_swagger_are_not_logged() {
        assert!(!should_log_path("/health"));
        assert!(!should_log_path("/swagger-ui/index.html"));
        assert!(should_log_path("/api-doc/openapi.json"));
    }

    #[actix_web::test]
    async fn request_logging_passes_responses_through() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(log_requests))
                .route("/health", web::get().to(|| async { "ok" }))
                .route("/echo", web::get().to(|| async { "echo" })),
        )
        .await;

        for uri in ["/health", "/echo"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        let req = test::TestRequest::get().uri("/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn cors_preflight_allows_configured_origin_with_credentials() {
        let origins = vec!["http://localhost:5173".to_string()];
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&origins))
                .route("/health", web::get().to(|| async { "ok" })),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/health")
            .insert_header((header::ORIGIN, "http://localhost:5173"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[actix_web::test]
    async fn cors_rejects_unknown_origin() {
        let origins = vec!["http://localhost:5173".to_string()];
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&origins))
                .route("/health", web::get().to(|| async { "ok" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header((header::ORIGIN, "http://evil.example"))
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => {
                assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
                resp.status()
            }
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn wildcard_origin_is_echoed() {
        let origins = vec!["*".to_string()];
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&origins))
                .route("/health", web::get().to(|| async { "ok" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header((header::ORIGIN, "http://any.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://any.example"
        );
    }
}
