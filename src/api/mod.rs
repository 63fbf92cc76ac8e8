//! HTTP surface: routes plus the middleware stack shared by every route.

use crate::config::AllowedOrigins;
use crate::handlers::{self, AppState, ADMIN_KEY_HEADER};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Requests a single client may make inside one window.
pub const RATE_LIMIT_BURST: u32 = 120;
/// Length of the rate-limit window; a spent slot comes back only after it.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;
/// Survey bodies are small; 1 MiB is generous.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the application router.
///
/// Rate limiting keys on the TCP peer address, or on `X-Forwarded-For` /
/// `X-Real-IP` / `Forwarded` when `trust_proxy` is set. The peer address is
/// read from `ConnectInfo`, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let trust_proxy = state.config.trust_proxy;
    let cors = cors_layer(&state.config.allowed_origins);

    let routes = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/saveSurvey", post(handlers::save_survey))
        .route("/api/surveys", get(handlers::list_surveys))
        .route("/api/export", get(handlers::export_surveys))
        .fallback(handlers::not_found)
        .with_state(state);

    // The two key extractors produce different layer types, hence two arms.
    let limited = if trust_proxy {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(RATE_LIMIT_WINDOW_SECS)
                .burst_size(RATE_LIMIT_BURST)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
        );

        routes.layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
    } else {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(RATE_LIMIT_WINDOW_SECS)
                .burst_size(RATE_LIMIT_BURST)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
        );

        routes.layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
    };

    Ok(limited.layer(TraceLayer::new_for_http()).layer(cors))
}

/// `*` allows any origin; otherwise origins must match the list exactly.
fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ADMIN_KEY_HEADER),
        ]);

    match origins {
        AllowedOrigins::Any => base.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let allowed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring unparseable CORS origin {:?}", origin);
                        None
                    }
                })
                .collect();
            base.allow_origin(AllowOrigin::list(allowed))
        }
    }
}
