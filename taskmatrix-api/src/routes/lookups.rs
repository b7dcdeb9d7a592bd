//! Status and priority lists
//!
//! - `GET /statuses`
//! - `GET /priorities`
//!
//! Both are ordered by id, which is the seeded order.

use crate::{error::ApiResult, extract::Stores};
use axum::Json;
use taskmatrix_shared::models::lookup::{Priority, Status};

pub async fn list_statuses(stores: Stores) -> ApiResult<Json<Vec<Status>>> {
    Ok(Json(stores.lookups.list_statuses().await?))
}

pub async fn list_priorities(stores: Stores) -> ApiResult<Json<Vec<Priority>>> {
    Ok(Json(stores.lookups.list_priorities().await?))
}
