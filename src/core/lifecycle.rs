//! Lifecycle manager - enrollment creation guards, status transitions, and
//! cascading deletes.
//!
//! Cascades run in one transaction and delete children before parents:
//! payments, then enrollments, then the user or course. Any failure rolls the
//! whole cascade back.

use crate::{
    core::{course, enrollment, payment, user},
    entities::{
        Course, Enrollment, EnrollmentStatus, Payment, Role, User, course as course_entity,
        enrollment as enrollment_entity, payment as payment_entity,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Changes to an enrollment. `enrolled_at` is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentUpdate {
    pub status: Option<EnrollmentStatus>,
    pub progress: Option<f64>,
}

/// Rows removed (or detached) by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeSummary {
    pub payments_deleted: u64,
    pub enrollments_deleted: u64,
    /// Courses whose `teacher_id` was cleared
    pub courses_unassigned: u64,
}

/// Enrolls a student in a course.
pub async fn create_enrollment(
    db: &DatabaseConnection,
    student_id: i64,
    course_id: i64,
) -> Result<enrollment_entity::Model> {
    create_enrollment_at(db, student_id, course_id, Utc::now()).await
}

/// [`create_enrollment`] with an explicit start instant.
///
/// # Errors
/// * `NotFound` if the student or course does not exist
/// * `Validation` if the user is not an active student
/// * `InactiveCourse` if the course is not accepting enrollments
/// * `AlreadyEnrolled` if the pair is already enrolled
#[instrument(skip(db))]
pub async fn create_enrollment_at(
    db: &DatabaseConnection,
    student_id: i64,
    course_id: i64,
    enrolled_at: DateTime<Utc>,
) -> Result<enrollment_entity::Model> {
    let txn = db.begin().await?;

    let student = user::get_user(&txn, student_id)
        .await?
        .ok_or_else(|| Error::not_found("user", student_id))?;
    if student.role != Role::Student {
        return Err(Error::validation(format!(
            "User {student_id} is not a student"
        )));
    }
    if !student.is_active {
        return Err(Error::validation(format!(
            "Student {student_id} is inactive"
        )));
    }

    let course = course::get_course(&txn, course_id)
        .await?
        .ok_or_else(|| Error::not_found("course", course_id))?;
    if !course.is_active {
        warn!(course_id, "Rejected enrollment in inactive course");
        return Err(Error::InactiveCourse { course_id });
    }

    let duplicate = Enrollment::find()
        .filter(enrollment_entity::Column::StudentId.eq(student_id))
        .filter(enrollment_entity::Column::CourseId.eq(course_id))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        warn!(student_id, course_id, "Rejected duplicate enrollment");
        return Err(Error::AlreadyEnrolled {
            student_id,
            course_id,
        });
    }

    let model = enrollment_entity::ActiveModel {
        student_id: Set(student_id),
        course_id: Set(course_id),
        enrolled_at: Set(enrolled_at),
        status: Set(EnrollmentStatus::Active),
        progress: Set(0.0),
        ..Default::default()
    };
    // The unique index catches a racing insert the lookup above missed.
    let created = model.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::AlreadyEnrolled {
            student_id,
            course_id,
        },
        _ => Error::from(e),
    })?;
    txn.commit().await?;

    info!(enrollment_id = created.id, "Created enrollment");
    Ok(created)
}

/// Applies a status transition and/or progress change.
#[instrument(skip(db))]
pub async fn update_enrollment(
    db: &DatabaseConnection,
    enrollment_id: i64,
    update: EnrollmentUpdate,
) -> Result<enrollment_entity::Model> {
    let existing = enrollment::get_enrollment(db, enrollment_id)
        .await?
        .ok_or_else(|| Error::not_found("enrollment", enrollment_id))?;

    if let Some(next) = update.status {
        if !existing.status.can_transition_to(next) {
            warn!(
                enrollment_id,
                from = existing.status.as_str(),
                to = next.as_str(),
                "Rejected status transition"
            );
            return Err(Error::InvalidTransition {
                from: existing.status.as_str(),
                to: next.as_str(),
            });
        }
    }
    if let Some(progress) = update.progress {
        if !(0.0..=100.0).contains(&progress) {
            return Err(Error::validation(format!(
                "Progress must be between 0 and 100, got {progress}"
            )));
        }
    }

    let previous_status = existing.status;
    let mut active: enrollment_entity::ActiveModel = existing.into();
    if let Some(status) = update.status {
        active.status = Set(status);
    }
    if let Some(progress) = update.progress {
        active.progress = Set(progress);
    }
    let updated = active.update(db).await?;

    if updated.status != previous_status {
        info!(
            enrollment_id,
            from = previous_status.as_str(),
            to = updated.status.as_str(),
            "Enrollment status changed"
        );
    }
    Ok(updated)
}

/// Deletes payments belonging to `enrollment_ids`, then the enrollments.
async fn delete_enrollments_with_payments<C: ConnectionTrait>(
    txn: &C,
    enrollment_ids: &[i64],
    summary: &mut CascadeSummary,
) -> Result<()> {
    if enrollment_ids.is_empty() {
        return Ok(());
    }
    summary.payments_deleted += Payment::delete_many()
        .filter(payment_entity::Column::EnrollmentId.is_in(enrollment_ids.iter().copied()))
        .exec(txn)
        .await?
        .rows_affected;
    summary.enrollments_deleted += Enrollment::delete_many()
        .filter(enrollment_entity::Column::Id.is_in(enrollment_ids.iter().copied()))
        .exec(txn)
        .await?
        .rows_affected;
    Ok(())
}

/// Deletes one enrollment and its payments.
#[instrument(skip(db))]
pub async fn delete_enrollment(
    db: &DatabaseConnection,
    enrollment_id: i64,
) -> Result<CascadeSummary> {
    let txn = db.begin().await?;
    if enrollment::get_enrollment(&txn, enrollment_id).await?.is_none() {
        return Err(Error::not_found("enrollment", enrollment_id));
    }

    let mut summary = CascadeSummary::default();
    delete_enrollments_with_payments(&txn, &[enrollment_id], &mut summary).await?;
    txn.commit().await?;

    info!(payments = summary.payments_deleted, "Deleted enrollment");
    Ok(summary)
}

/// Hard-deletes a user with everything that references it.
///
/// The user's enrollments and their payments are deleted; courses the user
/// teaches are kept and lose their teacher.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<CascadeSummary> {
    let txn = db.begin().await?;
    if user::get_user(&txn, user_id).await?.is_none() {
        return Err(Error::not_found("user", user_id));
    }

    let mut summary = CascadeSummary::default();
    let enrollment_ids = payment::enrollment_ids_for_student(&txn, user_id).await?;
    delete_enrollments_with_payments(&txn, &enrollment_ids, &mut summary).await?;

    summary.courses_unassigned = Course::update_many()
        .col_expr(course_entity::Column::TeacherId, Expr::value(Option::<i64>::None))
        .filter(course_entity::Column::TeacherId.eq(user_id))
        .exec(&txn)
        .await?
        .rows_affected;

    User::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        payments = summary.payments_deleted,
        enrollments = summary.enrollments_deleted,
        courses_unassigned = summary.courses_unassigned,
        "Deleted user"
    );
    Ok(summary)
}

/// Hard-deletes a course with all its enrollments and their payments.
#[instrument(skip(db))]
pub async fn delete_course(db: &DatabaseConnection, course_id: i64) -> Result<CascadeSummary> {
    let txn = db.begin().await?;
    if course::get_course(&txn, course_id).await?.is_none() {
        return Err(Error::not_found("course", course_id));
    }

    let enrollment_ids: Vec<i64> = Enrollment::find()
        .select_only()
        .column(enrollment_entity::Column::Id)
        .filter(enrollment_entity::Column::CourseId.eq(course_id))
        .into_tuple()
        .all(&txn)
        .await?;

    let mut summary = CascadeSummary::default();
    delete_enrollments_with_payments(&txn, &enrollment_ids, &mut summary).await?;
    Course::delete_by_id(course_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        payments = summary.payments_deleted,
        enrollments = summary.enrollments_deleted,
        "Deleted course"
    );
    Ok(summary)
}
