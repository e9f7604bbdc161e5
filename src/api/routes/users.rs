//! Admin user management.

use crate::{
    api::{AppState, extractors::RequireAdmin},
    core::{
        lifecycle::{self, CascadeSummary},
        user::{self, NewUser, UserFilter, UserUpdate},
    },
    entities::{Role, UserModel},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    /// `null` clears the number
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub phone_number: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/deactivate", post(deactivate_user))
}

async fn create_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserModel>)> {
    let created = user::create_user(
        &state.db,
        NewUser {
            email: request.email,
            password_hash: request.password_hash,
            full_name: request.full_name,
            phone_number: request.phone_number,
            role: request.role,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserModel>>> {
    let filter = UserFilter {
        role: query.role,
        is_active: query.is_active,
        offset: query.offset,
        limit: query.limit,
    };
    Ok(Json(user::list_users(&state.db, &filter).await?))
}

async fn get_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<UserModel>> {
    user::get_user(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("user", id))
}

async fn update_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserModel>> {
    let update = UserUpdate {
        full_name: request.full_name,
        phone_number: request.phone_number,
        is_active: request.is_active,
    };
    Ok(Json(user::update_user(&state.db, id, update).await?))
}

async fn deactivate_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<UserModel>> {
    Ok(Json(user::deactivate_user(&state.db, id).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<CascadeSummary>> {
    Ok(Json(lifecycle::delete_user(&state.db, id).await?))
}
