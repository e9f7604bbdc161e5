//! Student self-service reads.

use super::payments::PaymentResponse;
use crate::{
    api::{AppState, extractors::RequireStudent},
    core::{enrollment, ledger::Balance, payment},
    entities::EnrollmentModel,
    errors::Result,
};
use axum::{Json, Router, extract::State, routing::get};
use rust_decimal::Decimal;
use serde::Serialize;

/// One of the caller's enrollments with the course it is for.
#[derive(Debug, Serialize)]
pub struct MyCourse {
    #[serde(flatten)]
    pub enrollment: EnrollmentModel,
    pub course_name: Option<String>,
    pub course_price: Option<Decimal>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(my_courses))
        .route("/balances", get(my_balances))
        .route("/payments", get(my_payments))
}

async fn my_courses(
    State(state): State<AppState>,
    RequireStudent(caller): RequireStudent,
) -> Result<Json<Vec<MyCourse>>> {
    let rows = enrollment::enrollments_with_course(&state.db, caller.user_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|(enrollment, course)| MyCourse {
                enrollment,
                course_price: course.as_ref().map(|c| c.price()),
                course_name: course.map(|c| c.name),
            })
            .collect(),
    ))
}

async fn my_balances(
    State(state): State<AppState>,
    RequireStudent(caller): RequireStudent,
) -> Result<Json<Vec<Balance>>> {
    Ok(Json(state.ledger.student_balances(caller.user_id).await?))
}

async fn my_payments(
    State(state): State<AppState>,
    RequireStudent(caller): RequireStudent,
) -> Result<Json<Vec<PaymentResponse>>> {
    let payments = payment::payments_for_student(&state.db, caller.user_id).await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}
