//! Shared fixtures for the store integration tests
//!
//! Tests need PostgreSQL at `DATABASE_URL`. When it is unset, [`TestContext::new`]
//! returns `None` and the test returns early.
//!
//! Usernames and emails carry a UUID suffix so tests can share one database.

#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::PgPool;
use taskmatrix_shared::db::migrations::{run_migrations, seed_lookups};
use taskmatrix_shared::db::pool::{create_pool, DatabaseConfig};
use taskmatrix_shared::db::Db;
use taskmatrix_shared::models::lookup::{Priority, Status};
use taskmatrix_shared::models::project::NewProject;
use taskmatrix_shared::models::task::TaskInput;
use taskmatrix_shared::models::user::{NewUser, UserIdentity};
use taskmatrix_shared::store::lookups::LookupStore;
use taskmatrix_shared::store::projects::ProjectStore;
use taskmatrix_shared::store::tasks::TaskStore;
use taskmatrix_shared::store::users::UserDirectory;
use uuid::Uuid;

pub struct TestContext {
    pub pool: PgPool,
    pub db: Db,
    pub users: UserDirectory,
    pub projects: ProjectStore,
    pub tasks: TaskStore,
    pub lookups: LookupStore,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set; skipping database test");
                return None;
            }
        };

        let pool = create_pool(DatabaseConfig {
            url,
            max_connections: 5,
            ..Default::default()
        })
        .await
        .expect("Failed to create pool");

        run_migrations(&pool).await.expect("Failed to run migrations");
        seed_lookups(&pool).await.expect("Failed to seed lookups");

        let db = Db::new(pool.clone());

        Some(Self {
            users: UserDirectory::new(db.clone()),
            projects: ProjectStore::new(db.clone()),
            tasks: TaskStore::new(db.clone()),
            lookups: LookupStore::new(db.clone()),
            pool,
            db,
        })
    }

    /// Creates a user whose username is `prefix` plus a unique suffix
    pub async fn create_user(&self, prefix: &str) -> UserIdentity {
        let new_user = new_user(prefix);
        let id = self.users.create_user(new_user).await.expect("Failed to create user");
        self.users.find_by_id(id).await.expect("Failed to load user")
    }

    pub async fn create_project(&self, owner_id: i32, title: &str) -> i32 {
        self.projects
            .create_project(owner_id, new_project(title))
            .await
            .expect("Failed to create project")
    }

    pub async fn status(&self, name: &str) -> Status {
        Status::find_by_name(&self.pool, name)
            .await
            .expect("Failed to query statuses")
            .expect("Status not seeded")
    }

    pub async fn priority(&self, name: &str) -> Priority {
        self.lookups
            .list_priorities()
            .await
            .expect("Failed to list priorities")
            .into_iter()
            .find(|p| p.name == name)
            .expect("Priority not seeded")
    }

    /// Task input with the given status and assignee, priority "Medium"
    pub async fn task_input(&self, title: &str, status: &str, assignee_id: i32) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: String::new(),
            priority_id: self.priority("Medium").await.id,
            status_id: self.status(status).await.id,
            assignee_id,
        }
    }
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

pub fn new_user(prefix: &str) -> NewUser {
    let username = unique(prefix);
    NewUser {
        name: prefix.to_string(),
        email: format!("{}@example.com", username),
        username,
        avatar_url: String::new(),
        password_digest: "digest".to_string(),
    }
}

pub fn new_project(title: &str) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: String::new(),
        due_date: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"),
    }
}
