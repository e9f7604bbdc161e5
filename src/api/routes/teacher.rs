//! Teacher reads, limited to the courses assigned to the caller.

use super::courses::CourseResponse;
use crate::{
    api::{AppState, extractors::RequireTeacher},
    core::{course, enrollment},
    entities::EnrollmentModel,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

/// An active enrollment in one of the caller's courses.
#[derive(Debug, Serialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub enrollment: EnrollmentModel,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub course_id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(my_courses))
        .route("/courses/{id}", get(my_course))
        .route("/students", get(my_students))
}

async fn my_courses(
    State(state): State<AppState>,
    RequireTeacher(caller): RequireTeacher,
) -> Result<Json<Vec<CourseResponse>>> {
    let courses = course::list_courses_for_teacher(&state.db, caller.user_id).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

async fn my_course(
    State(state): State<AppState>,
    RequireTeacher(caller): RequireTeacher,
    Path(id): Path<i64>,
) -> Result<Json<CourseResponse>> {
    let found = course::get_course_for_teacher(&state.db, caller.user_id, id).await?;
    Ok(Json(found.into()))
}

async fn my_students(
    State(state): State<AppState>,
    RequireTeacher(caller): RequireTeacher,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Vec<RosterEntry>>> {
    let roster = enrollment::roster_for_teacher(&state.db, caller.user_id, query.course_id).await?;
    Ok(Json(
        roster
            .into_iter()
            .map(|(enrollment, student)| RosterEntry {
                enrollment,
                student_name: student.as_ref().map(|s| s.full_name.clone()),
                student_email: student.map(|s| s.email),
            })
            .collect(),
    ))
}
