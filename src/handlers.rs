use crate::config::Config;
use crate::db_storage::SurveyStorage;
use crate::errors::AppError;
use crate::export::surveys_to_csv;
use crate::models::*;
use crate::normalize::normalize_survey;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header carrying the shared admin secret.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool over the survey database.
    pub db: SqlitePool,
    /// Application configuration.
    pub config: Config,
}

/// Current UTC time as `2026-01-02T03:04:05.678Z`.
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: now_iso(),
    })
}

/// POST /api/saveSurvey
///
/// Public write path. The body is coerced field by field and never rejected
/// for its shape or its `Content-Type`; only bytes that are not JSON at all
/// are refused.
pub async fn save_survey(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Result<Json<SaveSurveyResponse>, AppError> {
    let payload = parse_survey_body(&body)?;

    let survey = NewSurvey {
        created_at: now_iso(),
        fields: normalize_survey(&payload),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ip: client_ip(&headers, peer.map(|ConnectInfo(addr)| addr), state.config.trust_proxy),
    };

    let id = SurveyStorage::new(state.db.clone())
        .insert(&survey)
        .await?;

    tracing::info!("Stored survey {} from {:?}", id, survey.ip);

    Ok(Json(SaveSurveyResponse { ok: true, id }))
}

/// GET /api/surveys?limit&offset
///
/// Admin-only listing, newest first. The response echoes the effective
/// limit and offset so callers can see any clamping.
pub async fn list_surveys(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListQuery>,
) -> Result<Json<SurveyPage>, AppError> {
    require_admin(&state, &headers)?;

    let (limit, offset) = effective_page(&params);
    let rows = SurveyStorage::new(state.db.clone())
        .list_page(limit, offset)
        .await?;

    tracing::info!(
        "Listed {} surveys (limit {}, offset {})",
        rows.len(),
        limit,
        offset
    );

    Ok(Json(SurveyPage { rows, limit, offset }))
}

/// GET /api/export
///
/// Admin-only CSV dump of every survey, oldest first.
pub async fn export_surveys(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &headers)?;

    let records = SurveyStorage::new(state.db.clone()).list_all().await?;
    let body = surveys_to_csv(&records)?;

    tracing::info!("Exported {} surveys as CSV", records.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"surveys.csv\"",
            ),
        ],
        body,
    ))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Reads a submission body. A blank body counts as an empty object.
pub fn parse_survey_body(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected survey body: {}", e);
        AppError::BadRequest("Invalid JSON body".to_string())
    })
}

/// Resolves `limit`/`offset` query values to the values actually used.
///
/// `limit` defaults to 100 when absent, zero or non-numeric and is clamped to
/// `1..=1000`; `offset` defaults to 0 and is never negative.
pub fn effective_page(params: &ListQuery) -> (i64, i64) {
    let limit = match parse_whole(params.limit.as_deref()) {
        None | Some(0) => DEFAULT_PAGE_LIMIT,
        Some(n) => n.clamp(1, MAX_PAGE_LIMIT),
    };
    let offset = parse_whole(params.offset.as_deref()).unwrap_or(0).max(0);

    (limit, offset)
}

/// Parses a query value as a number, truncating any fraction.
fn parse_whole(raw: Option<&str>) -> Option<i64> {
    let n = raw?.trim().parse::<f64>().ok()?;
    // `as` saturates, and both callers clamp afterwards.
    n.is_finite().then(|| n.trunc() as i64)
}

/// Best-effort client address.
///
/// With `trust_proxy` the first `X-Forwarded-For` hop (or `X-Real-IP`) wins;
/// otherwise, and as a fallback, the TCP peer. Empty when nothing is known.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            });

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

/// Checks the `x-admin-key` header against the configured secret.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(ref expected_key) = state.config.admin_key else {
        return Err(AppError::NotConfigured(
            "ADMIN_KEY is not set".to_string(),
        ));
    };

    let key = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing x-admin-key header".to_string()))?;

    if !constant_time_compare(key, expected_key) {
        return Err(AppError::Unauthorized("Invalid admin key".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison (length is not hidden).
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn query(limit: Option<&str>, offset: Option<&str>) -> ListQuery {
        ListQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_survey_body() {
        assert_eq!(parse_survey_body(b"").unwrap(), Value::Object(Map::new()));
        assert_eq!(parse_survey_body(b" \r\n").unwrap(), Value::Object(Map::new()));
        assert_eq!(
            parse_survey_body(br#"{"seats":12}"#).unwrap(),
            serde_json::json!({ "seats": 12 })
        );
        assert!(parse_survey_body(b"{not json").is_err());
        assert!(parse_survey_body(b"seats=12").is_err());
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(effective_page(&query(None, None)), (100, 0));
        assert_eq!(effective_page(&query(Some("abc"), Some("xyz"))), (100, 0));
        assert_eq!(effective_page(&query(Some("0"), Some(""))), (100, 0));
    }

    #[test]
    fn test_page_clamping() {
        assert_eq!(effective_page(&query(Some("1000000"), None)), (1000, 0));
        assert_eq!(effective_page(&query(Some("-5"), Some("-20"))), (1, 0));
        assert_eq!(effective_page(&query(Some("25.9"), Some("10.2"))), (25, 10));
        assert_eq!(effective_page(&query(Some(" 50 "), Some("1e2"))), (50, 100));
    }

    #[test]
    fn test_client_ip_resolution() {
        let peer: SocketAddr = "10.0.0.1:5555".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );

        assert_eq!(client_ip(&headers, Some(peer), true), "203.0.113.9");
        assert_eq!(client_ip(&headers, Some(peer), false), "10.0.0.1");
        assert_eq!(client_ip(&HeaderMap::new(), None, true), "");

        let mut real_ip = HeaderMap::new();
        real_ip.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_ip(&real_ip, None, true), "198.51.100.7");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret", "secret"));
        assert!(!constant_time_compare("secret", "secreT"));
        assert!(!constant_time_compare("secret", "secret!"));
        assert!(!constant_time_compare("", "secret"));
    }
}
