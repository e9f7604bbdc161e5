//! Course business logic - Creation, lookup, and updates of billable courses.
//!
//! Price changes take effect immediately for every enrollment because the ledger
//! reads the current price on each balance computation.

use crate::{
    core::{level, money, user},
    entities::{Course, Role, course},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Input for [`create_course`].
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub description: Option<String>,
    /// Must reference an existing level when set
    pub level_id: Option<i64>,
    /// Must reference a user with the `TEACHER` role when set
    pub teacher_id: Option<i64>,
    pub capacity: i32,
    /// Monthly price
    pub price: Decimal,
}

/// Mutable course fields. `Some(None)` on an optional column clears it.
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub level_id: Option<Option<i64>>,
    pub teacher_id: Option<Option<i64>>,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
    pub is_active: Option<bool>,
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Course name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_capacity(capacity: i32) -> Result<i32> {
    if capacity <= 0 {
        return Err(Error::validation(format!(
            "Capacity must be positive, got {capacity}"
        )));
    }
    Ok(capacity)
}

async fn validate_teacher(db: &DatabaseConnection, teacher_id: i64) -> Result<()> {
    let teacher = user::get_user(db, teacher_id)
        .await?
        .ok_or_else(|| Error::not_found("user", teacher_id))?;
    if teacher.role != Role::Teacher {
        return Err(Error::validation(format!(
            "User {teacher_id} is not a teacher"
        )));
    }
    Ok(())
}

async fn validate_level(db: &DatabaseConnection, level_id: i64) -> Result<()> {
    level::get_level(db, level_id)
        .await?
        .ok_or_else(|| Error::not_found("level", level_id))?;
    Ok(())
}

/// Creates an active course.
pub async fn create_course(db: &DatabaseConnection, new_course: NewCourse) -> Result<course::Model> {
    let name = validate_name(&new_course.name)?;
    let capacity = validate_capacity(new_course.capacity)?;
    let price_cents = money::non_negative_cents(new_course.price)?;
    if let Some(teacher_id) = new_course.teacher_id {
        validate_teacher(db, teacher_id).await?;
    }
    if let Some(level_id) = new_course.level_id {
        validate_level(db, level_id).await?;
    }

    let now = Utc::now();
    let model = course::ActiveModel {
        name: Set(name),
        description: Set(new_course.description),
        level_id: Set(new_course.level_id),
        teacher_id: Set(new_course.teacher_id),
        capacity: Set(capacity),
        price_cents: Set(price_cents),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        course_id = created.id,
        price = %created.price(),
        "Created course '{}'",
        created.name
    );
    Ok(created)
}

/// Finds a course by id.
pub async fn get_course<C: ConnectionTrait>(
    db: &C,
    course_id: i64,
) -> Result<Option<course::Model>> {
    Course::find_by_id(course_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists courses ordered by id, optionally only active or inactive ones.
pub async fn list_courses(
    db: &DatabaseConnection,
    is_active: Option<bool>,
) -> Result<Vec<course::Model>> {
    let mut query = Course::find().order_by_asc(course::Column::Id);
    if let Some(is_active) = is_active {
        query = query.filter(course::Column::IsActive.eq(is_active));
    }
    query.all(db).await.map_err(Into::into)
}

/// Lists the courses assigned to a teacher.
pub async fn list_courses_for_teacher(
    db: &DatabaseConnection,
    teacher_id: i64,
) -> Result<Vec<course::Model>> {
    Course::find()
        .filter(course::Column::TeacherId.eq(teacher_id))
        .order_by_asc(course::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a course only if it is assigned to `teacher_id`. Courses taught by
/// someone else are reported as missing.
pub async fn get_course_for_teacher(
    db: &DatabaseConnection,
    teacher_id: i64,
    course_id: i64,
) -> Result<course::Model> {
    Course::find_by_id(course_id)
        .filter(course::Column::TeacherId.eq(teacher_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("course", course_id))
}

/// Applies a [`CourseUpdate`]. A new price applies to all existing enrollments.
pub async fn update_course(
    db: &DatabaseConnection,
    course_id: i64,
    update: CourseUpdate,
) -> Result<course::Model> {
    let existing = get_course(db, course_id)
        .await?
        .ok_or_else(|| Error::not_found("course", course_id))?;
    let old_price = existing.price();

    let mut active: course::ActiveModel = existing.into();
    if let Some(name) = update.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(description) = update.description {
        active.description = Set(description);
    }
    if let Some(level_id) = update.level_id {
        if let Some(id) = level_id {
            validate_level(db, id).await?;
        }
        active.level_id = Set(level_id);
    }
    if let Some(teacher_id) = update.teacher_id {
        if let Some(id) = teacher_id {
            validate_teacher(db, id).await?;
        }
        active.teacher_id = Set(teacher_id);
    }
    if let Some(capacity) = update.capacity {
        active.capacity = Set(validate_capacity(capacity)?);
    }
    if let Some(price) = update.price {
        active.price_cents = Set(money::non_negative_cents(price)?);
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    if updated.price() != old_price {
        info!(
            course_id,
            old_price = %old_price,
            new_price = %updated.price(),
            "Course price changed"
        );
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn new_course(name: &str, price: Decimal) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            description: None,
            level_id: None,
            teacher_id: None,
            capacity: 10,
            price,
        }
    }

    #[tokio::test]
    async fn test_create_course_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_course(&db, new_course("  ", dec!(10))).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_course(&db, new_course("Piano", dec!(-1))).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let mut zero_capacity = new_course("Piano", dec!(10));
        zero_capacity.capacity = 0;
        let result = create_course(&db, zero_capacity).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let mut unknown_level = new_course("Piano", dec!(10));
        unknown_level.level_id = Some(77);
        let result = create_course(&db, unknown_level).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "level",
                id: 77
            }
        ));

        assert!(list_courses(&db, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_course_with_teacher() -> Result<()> {
        let db = setup_test_db().await?;
        let teacher = create_test_user(&db, "Ms Teacher", Role::Teacher).await?;

        let mut input = new_course("Violin", dec!(75.50));
        input.teacher_id = Some(teacher.id);
        let created = create_course(&db, input).await?;

        assert_eq!(created.price(), dec!(75.50));
        assert_eq!(created.price_cents, 7_550);
        assert_eq!(created.teacher_id, Some(teacher.id));
        assert!(created.is_active);

        let taught = list_courses_for_teacher(&db, teacher.id).await?;
        assert_eq!(taught.len(), 1);
        assert_eq!(taught[0].id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_teacher_must_have_teacher_role() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "Not A Teacher").await?;

        let mut input = new_course("Cello", dec!(50));
        input.teacher_id = Some(student.id);
        let result = create_course(&db, input).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let mut input = new_course("Cello", dec!(50));
        input.teacher_id = Some(404);
        let result = create_course(&db, input).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_course_price_and_activity() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_course(&db, "Drums", dec!(100)).await?;

        let updated = update_course(
            &db,
            created.id,
            CourseUpdate {
                price: Some(dec!(120)),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.price(), dec!(120));
        assert!(!updated.is_active);
        assert_eq!(updated.name, "Drums");

        let active = list_courses(&db, Some(true)).await?;
        assert!(active.is_empty());
        let all = list_courses(&db, None).await?;
        assert_eq!(all.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_course_clears_teacher() -> Result<()> {
        let db = setup_test_db().await?;
        let teacher = create_test_user(&db, "Mr Teacher", Role::Teacher).await?;
        let mut input = new_course("Flute", dec!(40));
        input.teacher_id = Some(teacher.id);
        let created = create_course(&db, input).await?;

        let updated = update_course(
            &db,
            created.id,
            CourseUpdate {
                teacher_id: Some(None),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.teacher_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_course() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_course(&db, 12, CourseUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "course",
                id: 12
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_course_grouped_under_level() -> Result<()> {
        let db = setup_test_db().await?;
        let beginner = level::create_level(
            &db,
            level::NewLevel {
                name: "Beginner".to_string(),
                description: None,
                order: 1,
                passing_score_requirement: level::DEFAULT_PASSING_SCORE,
            },
        )
        .await?;

        let mut input = new_course("Recorder", dec!(30));
        input.level_id = Some(beginner.id);
        let created = create_course(&db, input).await?;
        assert_eq!(created.level_id, Some(beginner.id));

        let result = update_course(
            &db,
            created.id,
            CourseUpdate {
                level_id: Some(Some(beginner.id + 1)),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_course_for_teacher_hides_other_courses() -> Result<()> {
        let db = setup_test_db().await?;
        let mine = create_test_user(&db, "Mine Teacher", Role::Teacher).await?;
        let other = create_test_user(&db, "Other Teacher", Role::Teacher).await?;
        let mut input = new_course("Oboe", dec!(60));
        input.teacher_id = Some(other.id);
        let created = create_course(&db, input).await?;

        let found = get_course_for_teacher(&db, other.id, created.id).await?;
        assert_eq!(found.id, created.id);

        let result = get_course_for_teacher(&db, mine.id, created.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "course", .. }
        ));
        Ok(())
    }
}
