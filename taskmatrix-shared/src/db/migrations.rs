//! Schema migrations and lookup seeding
//!
//! Migrations live in `migrations/` at the workspace root and are embedded at
//! compile time. Lookup rows (statuses, priorities) are seeded by a migration
//! and re-asserted by [`seed_lookups`] on every startup, which is idempotent.
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_shared::db::pool::{create_pool, DatabaseConfig};
//! use taskmatrix_shared::db::migrations::{run_migrations, seed_lookups};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//! run_migrations(&pool).await?;
//! seed_lookups(&pool).await?;
//! # Ok(())
//! # }
//! ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

use crate::models::lookup::{PRIORITY_NAMES, STATUS_NAMES};

/// Applies all pending migrations
///
/// Concurrent callers are serialized by sqlx's advisory lock.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Inserts the fixed statuses and priorities if they are missing
///
/// Safe to run on every startup: existing rows are left untouched.
pub async fn seed_lookups(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statuses = sqlx::query(
        "INSERT INTO statuses (name) SELECT unnest($1::text[]) ON CONFLICT (name) DO NOTHING",
    )
    .bind(&STATUS_NAMES[..])
    .execute(pool)
    .await?;

    let priorities = sqlx::query(
        "INSERT INTO priorities (name) SELECT unnest($1::text[]) ON CONFLICT (name) DO NOTHING",
    )
    .bind(&PRIORITY_NAMES[..])
    .execute(pool)
    .await?;

    debug!(
        statuses_inserted = statuses.rows_affected(),
        priorities_inserted = priorities.rows_affected(),
        "Lookup tables seeded"
    );

    Ok(())
}

/// Creates the database if it doesn't exist (development setups)
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
