use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============ Database Models ============

/// Column order of the `surveys` table, as exposed by the CSV export.
pub const SURVEY_COLUMNS: [&str; 23] = [
    "id",
    "created_at",
    "store_name",
    "business_type",
    "monthly_revenue",
    "food_cost",
    "labor_cost",
    "rent_cost",
    "utility_cost",
    "marketing_cost",
    "daily_customers",
    "seats",
    "online_revenue",
    "repeat_purchases",
    "total_customers",
    "average_rating",
    "bad_reviews",
    "total_reviews",
    "social_media_mentions",
    "service_bad_review_rate",
    "taste_bad_review_rate",
    "user_agent",
    "ip",
];

/// The client-supplied part of a survey, after coercion.
///
/// Every field is independently nullable: missing or unparseable input is
/// stored as `NULL`, never as zero.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyFields {
    pub store_name: Option<String>,
    pub business_type: Option<String>,
    pub monthly_revenue: Option<i64>,
    pub food_cost: Option<i64>,
    pub labor_cost: Option<i64>,
    pub rent_cost: Option<i64>,
    pub utility_cost: Option<i64>,
    pub marketing_cost: Option<i64>,
    pub daily_customers: Option<i64>,
    pub seats: Option<i64>,
    pub online_revenue: Option<i64>,
    pub repeat_purchases: Option<i64>,
    pub total_customers: Option<i64>,
    /// Star rating; kept fractional.
    pub average_rating: Option<f64>,
    pub bad_reviews: Option<i64>,
    pub total_reviews: Option<i64>,
    pub social_media_mentions: Option<i64>,
    pub service_bad_review_rate: Option<f64>,
    pub taste_bad_review_rate: Option<f64>,
}

/// A survey ready to be written; the store assigns the identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSurvey {
    /// Server clock at submission time (ISO-8601, UTC).
    pub created_at: String,
    pub fields: SurveyFields,
    pub user_agent: Option<String>,
    /// Resolved client address, empty when unknown.
    pub ip: String,
}

/// One stored row of the `surveys` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub id: i64,
    pub created_at: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: SurveyFields,
    pub user_agent: Option<String>,
    pub ip: String,
}

// ============ API Models ============

/// Query string of `GET /api/surveys`.
///
/// Kept as raw strings so that garbage values fall back to defaults instead
/// of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Response of `GET /api/surveys`, echoing the effective paging values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyPage {
    pub rows: Vec<SurveyRecord>,
    pub limit: i64,
    pub offset: i64,
}

/// Response of `POST /api/saveSurvey`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSurveyResponse {
    pub ok: bool,
    pub id: i64,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub time: String,
}
