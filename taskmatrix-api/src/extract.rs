//! Request extractors shared by the handlers
//!
//! - [`Stores`]: the data-access stores, bounded by the request deadline
//! - [`ValidatedJson`]: a JSON body that has passed its `validator` rules
//!
//! Both reject with [`ApiError`] so failures use the common error body.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use taskmatrix_shared::db::Db;
use taskmatrix_shared::store::{
    lookups::LookupStore, projects::ProjectStore, tasks::TaskStore, users::UserDirectory,
};
use validator::Validate;

use crate::{app::AppState, error::ApiError, middleware::deadline::RequestDeadline};

/// Stores for one request
pub struct Stores {
    pub users: UserDirectory,
    pub projects: ProjectStore,
    pub tasks: TaskStore,
    pub lookups: LookupStore,
}

impl Stores {
    pub fn new(db: Db) -> Self {
        Self {
            users: UserDirectory::new(db.clone()),
            projects: ProjectStore::new(db.clone()),
            tasks: TaskStore::new(db.clone()),
            lookups: LookupStore::new(db),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Stores {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let db = match parts.extensions.get::<RequestDeadline>() {
            Some(deadline) => state.db.with_deadline(deadline.0),
            None => state.db.clone(),
        };
        Ok(Stores::new(db))
    }
}

/// JSON body validated with [`Validate`]
///
/// Malformed JSON is a 400; a well-formed body that breaks a rule is a 422
/// with one detail per field.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
