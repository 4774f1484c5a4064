//! Database migration command.

use docstore_core::config::AppConfig;
use docstore_core::error::AppError;
use docstore_database::DatabasePool;
use docstore_database::migration::run_migrations;

use crate::output;

/// Apply all pending migrations.
pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    println!("Running database migrations against {}...", config.database.url);
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    db.close().await;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
