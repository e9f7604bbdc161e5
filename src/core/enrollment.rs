//! Enrollment lookups. Writes go through [`crate::core::lifecycle`].

use crate::{
    core::DEFAULT_PAGE_SIZE,
    entities::{Course, Enrollment, EnrollmentStatus, User, course, enrollment, user},
    errors::Result,
};
use sea_orm::{JoinType, QueryOrder, QuerySelect, prelude::*};

/// Filter for [`list_enrollments`].
#[derive(Debug, Clone, Default)]
pub struct EnrollmentFilter {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub status: Option<EnrollmentStatus>,
    pub offset: u64,
    pub limit: Option<u64>,
}

/// Finds an enrollment by id.
pub async fn get_enrollment<C: ConnectionTrait>(
    db: &C,
    enrollment_id: i64,
) -> Result<Option<enrollment::Model>> {
    Enrollment::find_by_id(enrollment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists enrollments ordered by id.
pub async fn list_enrollments(
    db: &DatabaseConnection,
    filter: &EnrollmentFilter,
) -> Result<Vec<enrollment::Model>> {
    let mut query = Enrollment::find().order_by_asc(enrollment::Column::Id);
    if let Some(student_id) = filter.student_id {
        query = query.filter(enrollment::Column::StudentId.eq(student_id));
    }
    if let Some(course_id) = filter.course_id {
        query = query.filter(enrollment::Column::CourseId.eq(course_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(enrollment::Column::Status.eq(status));
    }
    query
        .offset(filter.offset)
        .limit(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active enrollments in the courses a teacher is assigned to, each with its
/// student. `course_id` narrows the roster to one of those courses.
pub async fn roster_for_teacher(
    db: &DatabaseConnection,
    teacher_id: i64,
    course_id: Option<i64>,
) -> Result<Vec<(enrollment::Model, Option<user::Model>)>> {
    let mut query = Enrollment::find()
        .join(JoinType::InnerJoin, enrollment::Relation::Course.def())
        .filter(course::Column::TeacherId.eq(teacher_id))
        .filter(enrollment::Column::Status.eq(EnrollmentStatus::Active));
    if let Some(course_id) = course_id {
        query = query.filter(enrollment::Column::CourseId.eq(course_id));
    }
    query
        .order_by_asc(enrollment::Column::Id)
        .find_also_related(User)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every enrollment a student holds, whatever its status, with its course.
pub async fn enrollments_with_course(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<(enrollment::Model, Option<course::Model>)>> {
    Enrollment::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .order_by_asc(enrollment::Column::Id)
        .find_also_related(Course)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{course as courses, lifecycle},
        entities::Role,
        test_utils::*,
    };
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_list_enrollments_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_student(&db, "Alice").await?;
        let bob = create_test_student(&db, "Bob").await?;
        let piano = create_test_course(&db, "Piano", dec!(100)).await?;
        let guitar = create_test_course(&db, "Guitar", dec!(80)).await?;

        lifecycle::create_enrollment(&db, alice.id, piano.id).await?;
        lifecycle::create_enrollment(&db, alice.id, guitar.id).await?;
        let bob_piano = lifecycle::create_enrollment(&db, bob.id, piano.id).await?;
        lifecycle::update_enrollment(
            &db,
            bob_piano.id,
            lifecycle::EnrollmentUpdate {
                status: Some(EnrollmentStatus::Dropped),
                progress: None,
            },
        )
        .await?;

        let for_alice = list_enrollments(
            &db,
            &EnrollmentFilter {
                student_id: Some(alice.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(for_alice.len(), 2);

        let for_piano = list_enrollments(
            &db,
            &EnrollmentFilter {
                course_id: Some(piano.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(for_piano.len(), 2);

        let dropped = list_enrollments(
            &db,
            &EnrollmentFilter {
                status: Some(EnrollmentStatus::Dropped),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].id, bob_piano.id);

        let page = list_enrollments(
            &db,
            &EnrollmentFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(page.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_enrollment() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_enrollment(&db, 1).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_roster_for_teacher() -> Result<()> {
        let db = setup_test_db().await?;
        let teacher = create_test_user(&db, "Roster Teacher", Role::Teacher).await?;
        let alice = create_test_student(&db, "Alice").await?;
        let bob = create_test_student(&db, "Bob").await?;
        let piano = create_test_course(&db, "Piano", dec!(100)).await?;
        let violin = create_test_course(&db, "Violin", dec!(90)).await?;
        let unassigned = create_test_course(&db, "Drums", dec!(70)).await?;
        for id in [piano.id, violin.id] {
            courses::update_course(
                &db,
                id,
                courses::CourseUpdate {
                    teacher_id: Some(Some(teacher.id)),
                    ..Default::default()
                },
            )
            .await?;
        }

        lifecycle::create_enrollment(&db, alice.id, piano.id).await?;
        lifecycle::create_enrollment(&db, alice.id, unassigned.id).await?;
        let bob_violin = lifecycle::create_enrollment(&db, bob.id, violin.id).await?;
        let bob_piano = lifecycle::create_enrollment(&db, bob.id, piano.id).await?;
        lifecycle::update_enrollment(
            &db,
            bob_piano.id,
            lifecycle::EnrollmentUpdate {
                status: Some(EnrollmentStatus::Dropped),
                progress: None,
            },
        )
        .await?;

        let roster = roster_for_teacher(&db, teacher.id, None).await?;
        assert_eq!(roster.len(), 2);
        let students: Vec<&str> = roster
            .iter()
            .map(|(_, s)| s.as_ref().unwrap().full_name.as_str())
            .collect();
        assert_eq!(students, ["Alice", "Bob"]);

        let violin_only = roster_for_teacher(&db, teacher.id, Some(violin.id)).await?;
        assert_eq!(violin_only.len(), 1);
        assert_eq!(violin_only[0].0.id, bob_violin.id);

        assert!(roster_for_teacher(&db, teacher.id, Some(unassigned.id)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_enrollments_with_course() -> Result<()> {
        let (db, student, course, enrollment) = setup_with_enrollment(dec!(45)).await?;
        create_test_student(&db, "Someone Else").await?;

        let rows = enrollments_with_course(&db, student.id).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.id, enrollment.id);
        assert_eq!(rows[0].1.as_ref().unwrap().id, course.id);
        Ok(())
    }
}
