//! Best-effort coercion of untrusted survey payloads.
//!
//! The public submission endpoint never rejects a payload because of its
//! shape: every recognized field is converted independently and anything
//! that cannot be converted becomes `None`.

use serde_json::{Map, Value};

use crate::models::SurveyFields;

/// Reads a JSON value as a finite number.
///
/// Strings are trimmed before parsing and booleans count as 1/0. Blank
/// strings, non-numeric strings, NaN and infinities yield `None`.
fn as_finite(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    number.is_finite().then_some(number)
}

/// Rounds to the nearest integer, ties toward positive infinity.
fn round_half_up(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Coerces a field to a whole number. Never fails.
pub fn to_int(value: Option<&Value>) -> Option<i64> {
    let rounded = round_half_up(as_finite(value?)?);
    // i64::MAX is not representable; its f64 cast is 2^63, which is out of range.
    if rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Coerces a field to a float without rounding. Never fails.
pub fn to_float(value: Option<&Value>) -> Option<f64> {
    as_finite(value?)
}

/// Coerces a field to trimmed text; blank text becomes `None`.
pub fn to_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };

    (!text.is_empty()).then_some(text)
}

/// Builds the typed survey fields from an arbitrary JSON payload.
///
/// Unknown keys are ignored; a payload that is not a JSON object yields a
/// record with every field null.
pub fn normalize_survey(payload: &Value) -> SurveyFields {
    let empty = Map::new();
    let object = payload.as_object().unwrap_or(&empty);
    let field = |key: &str| object.get(key);

    SurveyFields {
        store_name: to_text(field("storeName")),
        business_type: to_text(field("businessType")),
        monthly_revenue: to_int(field("monthlyRevenue")),
        food_cost: to_int(field("foodCost")),
        labor_cost: to_int(field("laborCost")),
        rent_cost: to_int(field("rentCost")),
        utility_cost: to_int(field("utilityCost")),
        marketing_cost: to_int(field("marketingCost")),
        daily_customers: to_int(field("dailyCustomers")),
        seats: to_int(field("seats")),
        online_revenue: to_int(field("onlineRevenue")),
        repeat_purchases: to_int(field("repeatPurchases")),
        total_customers: to_int(field("totalCustomers")),
        average_rating: to_float(field("averageRating")),
        bad_reviews: to_int(field("badReviews")),
        total_reviews: to_int(field("totalReviews")),
        social_media_mentions: to_int(field("socialMediaMentions")),
        service_bad_review_rate: to_float(field("serviceBadReviewRate")),
        taste_bad_review_rate: to_float(field("tasteBadReviewRate")),
    }
}
