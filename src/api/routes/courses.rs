//! Admin course management.

use crate::{
    api::{AppState, extractors::RequireAdmin},
    core::{
        course::{self, CourseUpdate, NewCourse},
        lifecycle::{self, CascadeSummary},
    },
    entities::CourseModel,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Course as returned over HTTP, with the price as a decimal.
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub level_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub capacity: i32,
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CourseModel> for CourseResponse {
    fn from(model: CourseModel) -> Self {
        Self {
            price: model.price(),
            id: model.id,
            name: model.name,
            description: model.description,
            level_id: model.level_id,
            teacher_id: model.teacher_id,
            capacity: model.capacity,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    pub description: Option<String>,
    pub level_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub capacity: i32,
    pub price: Decimal,
}

/// Absent optional fields are left alone; an explicit `null` clears them.
#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub level_id: Option<Option<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub teacher_id: Option<Option<i64>>,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListCoursesQuery {
    pub is_active: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", post(create_course).get(list_courses))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
}

async fn create_course(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>)> {
    let created = course::create_course(
        &state.db,
        NewCourse {
            name: request.name,
            description: request.description,
            level_id: request.level_id,
            teacher_id: request.teacher_id,
            capacity: request.capacity,
            price: request.price,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn list_courses(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<Vec<CourseResponse>>> {
    let courses = course::list_courses(&state.db, query.is_active).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

async fn get_course(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<CourseResponse>> {
    course::get_course(&state.db, id)
        .await?
        .map(|found| Json(found.into()))
        .ok_or_else(|| Error::not_found("course", id))
}

async fn update_course(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>> {
    let update = CourseUpdate {
        name: request.name,
        description: request.description,
        level_id: request.level_id,
        teacher_id: request.teacher_id,
        capacity: request.capacity,
        price: request.price,
        is_active: request.is_active,
    };
    let updated = course::update_course(&state.db, id, update).await?;
    Ok(Json(updated.into()))
}

async fn delete_course(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<CascadeSummary>> {
    Ok(Json(lifecycle::delete_course(&state.db, id).await?))
}
