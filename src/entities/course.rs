//! Course entity - A billable course with a monthly price.
//!
//! The price is stored in cents and is read fresh on every balance computation,
//! so a price change applies to every enrollment immediately.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Unique identifier for the course
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable course name
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Optional level grouping
    pub level_id: Option<i64>,
    /// Assigned teacher. Weak reference: no foreign key, cleared when the teacher is deleted
    pub teacher_id: Option<i64>,
    /// Maximum number of students
    pub capacity: i32,
    /// Monthly price in cents
    pub price_cents: i64,
    /// Inactive courses accept no new enrollments
    pub is_active: bool,
    /// When the course was created
    pub created_at: DateTimeUtc,
    /// When the course was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Monthly price as a two-digit decimal.
    #[must_use]
    pub fn price(&self) -> Decimal {
        crate::core::money::from_cents(self.price_cents)
    }
}

/// Defines relationships between Course and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One course has many enrollments
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
    /// Each course optionally belongs to a level
    #[sea_orm(
        belongs_to = "super::level::Entity",
        from = "Column::LevelId",
        to = "super::level::Column::Id"
    )]
    Level,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Level.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
