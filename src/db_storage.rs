use crate::errors::{AppError, ResultExt};
use crate::models::{NewSurvey, SurveyRecord};
use sqlx::SqlitePool;

/// Append-only access to the `surveys` table.
pub struct SurveyStorage {
    pool: SqlitePool,
}

impl SurveyStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes one survey and returns the identity SQLite assigned to it.
    ///
    /// A single statement, so the row is either fully written or absent.
    pub async fn insert(&self, survey: &NewSurvey) -> Result<i64, AppError> {
        let f = &survey.fields;

        let result = sqlx::query(
            r#"
            INSERT INTO surveys (
                created_at, store_name, business_type,
                monthly_revenue, food_cost, labor_cost, rent_cost, utility_cost, marketing_cost,
                daily_customers, seats, online_revenue, repeat_purchases, total_customers,
                average_rating, bad_reviews, total_reviews, social_media_mentions,
                service_bad_review_rate, taste_bad_review_rate,
                user_agent, ip
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&survey.created_at)
        .bind(&f.store_name)
        .bind(&f.business_type)
        .bind(f.monthly_revenue)
        .bind(f.food_cost)
        .bind(f.labor_cost)
        .bind(f.rent_cost)
        .bind(f.utility_cost)
        .bind(f.marketing_cost)
        .bind(f.daily_customers)
        .bind(f.seats)
        .bind(f.online_revenue)
        .bind(f.repeat_purchases)
        .bind(f.total_customers)
        .bind(f.average_rating)
        .bind(f.bad_reviews)
        .bind(f.total_reviews)
        .bind(f.social_media_mentions)
        .bind(f.service_bad_review_rate)
        .bind(f.taste_bad_review_rate)
        .bind(&survey.user_agent)
        .bind(&survey.ip)
        .execute(&self.pool)
        .await
        .context("Failed to insert survey")?;

        Ok(result.last_insert_rowid())
    }

    /// Newest first: at most `limit` rows after skipping `offset`.
    pub async fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<SurveyRecord>, AppError> {
        sqlx::query_as::<_, SurveyRecord>(
            "SELECT * FROM surveys ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to list surveys (limit {}, offset {})", limit, offset))
    }

    /// Every row, oldest first.
    pub async fn list_all(&self) -> Result<Vec<SurveyRecord>, AppError> {
        sqlx::query_as::<_, SurveyRecord>("SELECT * FROM surveys ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to read surveys for export")
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM surveys")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count surveys")?;

        Ok(total)
    }
}
