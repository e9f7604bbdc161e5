//! User entity - Represents every account in the institute.
//!
//! A user is an administrator, a teacher, or a student. Students own enrollments;
//! teachers are referenced (weakly, by id) from the courses they teach.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role granted to a user, checked by the access gate before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Reads the courses assigned to them
    #[sea_orm(string_value = "TEACHER")]
    Teacher,
    /// Reads their own enrollments, balances, and payments
    #[sea_orm(string_value = "STUDENT")]
    Student,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, stored lowercase
    #[sea_orm(unique)]
    pub email: String,
    /// Opaque password hash produced by the authentication service
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role used by the access gate
    pub role: Role,
    /// Display name
    pub full_name: String,
    /// Optional contact number
    pub phone_number: Option<String>,
    /// Soft deactivation flag - inactive users cannot act or be enrolled
    pub is_active: bool,
    /// When the user was created
    pub created_at: DateTimeUtc,
    /// When the user was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many enrollments
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
