//! Route definitions, grouped by caller role.

use super::AppState;
use axum::Router;

pub mod courses;
pub mod enrollments;
pub mod health;
pub mod levels;
pub mod payments;
pub mod student;
pub mod teacher;
pub mod users;

/// Routes nested under `/admin`. Every handler takes `RequireAdmin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(users::routes())
        .merge(levels::routes())
        .merge(courses::routes())
        .merge(enrollments::routes())
        .merge(payments::routes())
}
