//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{course, lifecycle, user},
    entities::{self, Enrollment, Role, enrollment},
    errors::Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a user with the given role. The email is derived from `name`.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    role: Role,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        user::NewUser {
            email: format!("{}@academy.test", name.to_lowercase().replace(' ', ".")),
            password_hash: "hash".to_string(),
            full_name: name.to_string(),
            phone_number: None,
            role,
        },
    )
    .await
}

/// Creates an active student.
pub async fn create_test_student(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user::Model> {
    create_test_user(db, name, Role::Student).await
}

/// Creates an active course with the given monthly price.
///
/// # Defaults
/// * capacity: 20
/// * no teacher, no level
pub async fn create_test_course(
    db: &DatabaseConnection,
    name: &str,
    price: Decimal,
) -> Result<entities::course::Model> {
    course::create_course(
        db,
        course::NewCourse {
            name: name.to_string(),
            description: None,
            level_id: None,
            teacher_id: None,
            capacity: 20,
            price,
        },
    )
    .await
}

/// Moves an enrollment's start back in time. Tests only: `enrolled_at` is
/// otherwise immutable.
pub async fn backdate_enrollment(
    db: &DatabaseConnection,
    enrollment_id: i64,
    enrolled_at: DateTime<Utc>,
) -> Result<entities::enrollment::Model> {
    let existing = Enrollment::find_by_id(enrollment_id)
        .one(db)
        .await?
        .ok_or_else(|| crate::errors::Error::not_found("enrollment", enrollment_id))?;
    let mut active: enrollment::ActiveModel = existing.into();
    active.enrolled_at = Set(enrolled_at);
    Ok(active.update(db).await?)
}

/// Sets up a student enrolled in a course priced at `price` per month.
/// Returns (db, student, course, enrollment).
pub async fn setup_with_enrollment(
    price: Decimal,
) -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::course::Model,
    entities::enrollment::Model,
)> {
    let db = setup_test_db().await?;
    let student = create_test_student(&db, "Test Student").await?;
    let course = create_test_course(&db, "Test Course", price).await?;
    let enrollment = lifecycle::create_enrollment(&db, student.id, course.id).await?;
    Ok((db, student, course, enrollment))
}
