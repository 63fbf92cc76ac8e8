use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::errors::AppError;
use crate::models::{SurveyRecord, SURVEY_COLUMNS};

/// Renders the survey rows as a CSV document.
///
/// The header is [`SURVEY_COLUMNS`]. Every cell is quoted, embedded quotes
/// are doubled and `NULL` becomes `""`. Lines are separated by `\n` with no
/// trailing newline after the last row.
pub fn surveys_to_csv(records: &[SurveyRecord]) -> Result<String, AppError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(SURVEY_COLUMNS)
        .map_err(|e| AppError::InternalError(format!("CSV header write failed: {}", e)))?;

    for record in records {
        wtr.write_record(record_cells(record))
            .map_err(|e| AppError::InternalError(format!("CSV row {} write failed: {}", record.id, e)))?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV flush failed: {}", e)))?;
    let mut document = String::from_utf8(data)
        .map_err(|e| AppError::InternalError(format!("CSV output is not UTF-8: {}", e)))?;

    if document.ends_with('\n') {
        document.pop();
    }

    Ok(document)
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// One CSV line, in [`SURVEY_COLUMNS`] order.
fn record_cells(record: &SurveyRecord) -> [String; SURVEY_COLUMNS.len()] {
    let f = &record.fields;
    [
        record.id.to_string(),
        record.created_at.clone(),
        cell(&f.store_name),
        cell(&f.business_type),
        cell(&f.monthly_revenue),
        cell(&f.food_cost),
        cell(&f.labor_cost),
        cell(&f.rent_cost),
        cell(&f.utility_cost),
        cell(&f.marketing_cost),
        cell(&f.daily_customers),
        cell(&f.seats),
        cell(&f.online_revenue),
        cell(&f.repeat_purchases),
        cell(&f.total_customers),
        cell(&f.average_rating),
        cell(&f.bad_reviews),
        cell(&f.total_reviews),
        cell(&f.social_media_mentions),
        cell(&f.service_bad_review_rate),
        cell(&f.taste_bad_review_rate),
        cell(&record.user_agent),
        record.ip.clone(),
    ]
}
