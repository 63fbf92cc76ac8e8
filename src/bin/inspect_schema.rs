//! Utility to inspect the survey database: prints the `surveys` table
//! structure and how many rows it holds.

use survey_intake_api::config::Config;
use survey_intake_api::db::Database;
use survey_intake_api::db_storage::SurveyStorage;

/// Main entry point for the schema inspection utility.
///
/// Uses the same `DB_PATH` as the server, so it also creates the file and
/// table when they do not exist yet.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let db = Database::new(&config.db_path).await?;

    println!("Database: {}", config.db_path.display());
    println!("- surveys");

    let columns: Vec<(i64, String, String, i64)> =
        sqlx::query_as(r#"SELECT cid, name, type, "notnull" FROM pragma_table_info('surveys')"#)
            .fetch_all(&db.pool)
            .await?;

    for (_, name, type_, not_null) in columns {
        let nullability = if not_null == 1 { " NOT NULL" } else { "" };
        println!("  - {}: {}{}", name, type_, nullability);
    }

    let total = SurveyStorage::new(db.pool.clone()).count().await?;
    println!();
    println!("Rows: {}", total);

    db.close().await;
    Ok(())
}
