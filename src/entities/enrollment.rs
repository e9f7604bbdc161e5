//! Enrollment entity - Links one student to one course.
//!
//! `enrolled_at` is written once at creation and drives billing. A student holds at
//! most one enrollment per course (composite unique index created at bootstrap).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enrollment status. `Completed` and `Dropped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    /// Student is currently attending
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Student finished the course
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Student left the course
    #[sea_orm(string_value = "DROPPED")]
    Dropped,
}

impl EnrollmentStatus {
    /// Whether an explicit update may move an enrollment from `self` to `next`.
    /// Writing the current status again is accepted as a no-op.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || matches!((self, next), (Self::Active, Self::Completed | Self::Dropped))
    }

    /// Canonical uppercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
        }
    }
}

/// Enrollment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    /// Unique identifier for the enrollment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Enrolled student
    pub student_id: i64,
    /// Course the student is enrolled in
    pub course_id: i64,
    /// When the enrollment was created; billing counts calendar months from here
    pub enrolled_at: DateTimeUtc,
    /// Current status
    pub status: EnrollmentStatus,
    /// Course progress percentage in [0, 100]
    pub progress: f64,
}

/// Defines relationships between Enrollment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each enrollment belongs to one student
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
    /// Each enrollment belongs to one course
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    /// One enrollment has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_can_finish_or_drop() {
        assert!(EnrollmentStatus::Active.can_transition_to(EnrollmentStatus::Completed));
        assert!(EnrollmentStatus::Active.can_transition_to(EnrollmentStatus::Dropped));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [EnrollmentStatus::Completed, EnrollmentStatus::Dropped] {
            assert!(!terminal.can_transition_to(EnrollmentStatus::Active));
        }
        assert!(!EnrollmentStatus::Completed.can_transition_to(EnrollmentStatus::Dropped));
        assert!(!EnrollmentStatus::Dropped.can_transition_to(EnrollmentStatus::Completed));
    }

    #[test]
    fn test_same_status_is_noop() {
        assert!(EnrollmentStatus::Dropped.can_transition_to(EnrollmentStatus::Dropped));
    }
}
