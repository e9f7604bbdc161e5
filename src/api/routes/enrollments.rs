//! Admin enrollment management and balance reads.

use crate::{
    api::{AppState, extractors::RequireAdmin},
    core::{
        enrollment::{self, EnrollmentFilter},
        ledger::Balance,
        lifecycle::{self, CascadeSummary, EnrollmentUpdate},
    },
    entities::{EnrollmentModel, EnrollmentStatus},
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
pub struct CreateEnrollmentRequest {
    pub student_id: i64,
    pub course_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEnrollmentRequest {
    pub status: Option<EnrollmentStatus>,
    pub progress: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ListEnrollmentsQuery {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub status: Option<EnrollmentStatus>,
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments", post(create_enrollment).get(list_enrollments))
        .route(
            "/enrollments/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .delete(delete_enrollment),
        )
        .route("/enrollments/{id}/balance", get(get_balance))
}

async fn create_enrollment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(request): Json<CreateEnrollmentRequest>,
) -> Result<(StatusCode, Json<EnrollmentModel>)> {
    let created =
        lifecycle::create_enrollment(&state.db, request.student_id, request.course_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_enrollments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListEnrollmentsQuery>,
) -> Result<Json<Vec<EnrollmentModel>>> {
    let filter = EnrollmentFilter {
        student_id: query.student_id,
        course_id: query.course_id,
        status: query.status,
        offset: query.offset,
        limit: query.limit,
    };
    Ok(Json(enrollment::list_enrollments(&state.db, &filter).await?))
}

async fn get_enrollment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<EnrollmentModel>> {
    enrollment::get_enrollment(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("enrollment", id))
}

async fn update_enrollment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEnrollmentRequest>,
) -> Result<Json<EnrollmentModel>> {
    let update = EnrollmentUpdate {
        status: request.status,
        progress: request.progress,
    };
    Ok(Json(lifecycle::update_enrollment(&state.db, id, update).await?))
}

async fn delete_enrollment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<CascadeSummary>> {
    Ok(Json(lifecycle::delete_enrollment(&state.db, id).await?))
}

async fn get_balance(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Balance>> {
    Ok(Json(state.ledger.balance(id).await?))
}
