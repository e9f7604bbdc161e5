//! Level entity - An ordered grouping of courses (e.g., "Beginner" before "Intermediate").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default score a student needs to pass a level.
pub const DEFAULT_PASSING_SCORE: i32 = 80;

/// Level database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "levels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across levels
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    /// Position in the progression; lists are sorted by it
    pub order: i32,
    /// Score out of 100 needed to pass
    pub passing_score_requirement: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One level groups many courses
    #[sea_orm(has_many = "super::course::Entity")]
    Courses,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
