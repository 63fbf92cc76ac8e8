use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Handle on the SQLite file that backs the survey store.
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file and its parent directory,
    /// then makes sure the `surveys` table exists.
    pub async fn new(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }

        // WAL lets readers proceed during a write; writers queue on the busy timeout.
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open SQLite database {}", db_path.display()))?;

        init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Waits for in-flight queries and closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Creates the `surveys` table if it is absent. Safe to call repeatedly.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS surveys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            store_name TEXT,
            business_type TEXT,
            monthly_revenue INTEGER,
            food_cost INTEGER,
            labor_cost INTEGER,
            rent_cost INTEGER,
            utility_cost INTEGER,
            marketing_cost INTEGER,
            daily_customers INTEGER,
            seats INTEGER,
            online_revenue INTEGER,
            repeat_purchases INTEGER,
            total_customers INTEGER,
            average_rating REAL,
            bad_reviews INTEGER,
            total_reviews INTEGER,
            social_media_mentions INTEGER,
            service_bad_review_rate REAL,
            taste_bad_review_rate REAL,
            user_agent TEXT,
            ip TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
