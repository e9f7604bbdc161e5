//! Admin level management.

use crate::{
    api::{AppState, extractors::RequireAdmin},
    core::level::{self, DEFAULT_PASSING_SCORE, LevelUpdate, NewLevel},
    entities::LevelModel,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

const fn default_passing_score() -> i32 {
    DEFAULT_PASSING_SCORE
}

#[derive(Debug, Deserialize)]
pub struct CreateLevelRequest {
    pub name: String,
    pub description: Option<String>,
    pub order: i32,
    #[serde(default = "default_passing_score")]
    pub passing_score_requirement: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLevelRequest {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    pub order: Option<i32>,
    pub passing_score_requirement: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/levels", post(create_level).get(list_levels))
        .route(
            "/levels/{id}",
            get(get_level).put(update_level).delete(delete_level),
        )
}

async fn create_level(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(request): Json<CreateLevelRequest>,
) -> Result<(StatusCode, Json<LevelModel>)> {
    let created = level::create_level(
        &state.db,
        NewLevel {
            name: request.name,
            description: request.description,
            order: request.order,
            passing_score_requirement: request.passing_score_requirement,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_levels(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<LevelModel>>> {
    Ok(Json(level::list_levels(&state.db).await?))
}

async fn get_level(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<LevelModel>> {
    level::get_level(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("level", id))
}

async fn update_level(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLevelRequest>,
) -> Result<Json<LevelModel>> {
    let update = LevelUpdate {
        name: request.name,
        description: request.description,
        order: request.order,
        passing_score_requirement: request.passing_score_requirement,
    };
    Ok(Json(level::update_level(&state.db, id, update).await?))
}

async fn delete_level(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    level::delete_level(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
