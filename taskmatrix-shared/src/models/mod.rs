//! Database models for Task Matrix
//!
//! Each model owns the SQL for its table. Functions are generic over
//! `PgExecutor`, so they run equally against the pool or inside a transaction.
//! Authorization and validation live one layer up, in [`crate::store`].
//!
//! # Models
//!
//! - `user`: accounts and the public [`user::UserIdentity`] view
//! - `lookup`: the fixed status and priority tables
//! - `project`: projects with soft deletion and aggregate counters
//! - `membership`: project/user membership pairs
//! - `task`: tasks scoped to a project
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_shared::models::user::UserIdentity;
//! use taskmatrix_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//! let bob = UserIdentity::find_by_username(&pool, "bob").await?;
//! # Ok(())
//! # }
//! ```

pub mod lookup;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;
