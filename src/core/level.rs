//! Level business logic - the ordered progression that courses are grouped under.

use crate::{
    entities::{Course, Level, course, level},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, SqlErr, prelude::*};
use tracing::info;

pub use level::DEFAULT_PASSING_SCORE;

/// Input for [`create_level`].
#[derive(Debug, Clone)]
pub struct NewLevel {
    pub name: String,
    pub description: Option<String>,
    pub order: i32,
    /// Score out of 100; callers usually pass [`DEFAULT_PASSING_SCORE`]
    pub passing_score_requirement: i32,
}

/// Mutable level fields. `Some(None)` on the description clears it.
#[derive(Debug, Clone, Default)]
pub struct LevelUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub order: Option<i32>,
    pub passing_score_requirement: Option<i32>,
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Level name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_passing_score(score: i32) -> Result<i32> {
    if !(0..=100).contains(&score) {
        return Err(Error::validation(format!(
            "Passing score must be between 0 and 100, got {score}"
        )));
    }
    Ok(score)
}

fn map_unique_name(e: DbErr, name: &str) -> Error {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            Error::validation(format!("Level '{name}' already exists"))
        }
        _ => Error::from(e),
    }
}

/// Creates a level. Names are unique.
pub async fn create_level(db: &DatabaseConnection, new_level: NewLevel) -> Result<level::Model> {
    let name = validate_name(&new_level.name)?;
    let passing_score = validate_passing_score(new_level.passing_score_requirement)?;

    let model = level::ActiveModel {
        name: Set(name.clone()),
        description: Set(new_level.description),
        order: Set(new_level.order),
        passing_score_requirement: Set(passing_score),
        ..Default::default()
    };
    let created = model
        .insert(db)
        .await
        .map_err(|e| map_unique_name(e, &name))?;
    info!(level_id = created.id, order = created.order, "Created level '{}'", created.name);
    Ok(created)
}

/// Finds a level by id.
pub async fn get_level<C: ConnectionTrait>(db: &C, level_id: i64) -> Result<Option<level::Model>> {
    Level::find_by_id(level_id).one(db).await.map_err(Into::into)
}

/// Lists every level in progression order.
pub async fn list_levels(db: &DatabaseConnection) -> Result<Vec<level::Model>> {
    Level::find()
        .order_by_asc(level::Column::Order)
        .order_by_asc(level::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a [`LevelUpdate`] field by field.
pub async fn update_level(
    db: &DatabaseConnection,
    level_id: i64,
    update: LevelUpdate,
) -> Result<level::Model> {
    let existing = get_level(db, level_id)
        .await?
        .ok_or_else(|| Error::not_found("level", level_id))?;
    let mut name = existing.name.clone();

    let mut active: level::ActiveModel = existing.into();
    if let Some(new_name) = update.name {
        name = validate_name(&new_name)?;
        active.name = Set(name.clone());
    }
    if let Some(description) = update.description {
        active.description = Set(description);
    }
    if let Some(order) = update.order {
        active.order = Set(order);
    }
    if let Some(score) = update.passing_score_requirement {
        active.passing_score_requirement = Set(validate_passing_score(score)?);
    }

    active.update(db).await.map_err(|e| map_unique_name(e, &name))
}

/// Deletes a level. Refused while any course is still grouped under it.
pub async fn delete_level(db: &DatabaseConnection, level_id: i64) -> Result<()> {
    get_level(db, level_id)
        .await?
        .ok_or_else(|| Error::not_found("level", level_id))?;

    let courses = Course::find()
        .filter(course::Column::LevelId.eq(level_id))
        .count(db)
        .await?;
    if courses > 0 {
        return Err(Error::validation(format!(
            "Level {level_id} is still assigned to {courses} course(s)"
        )));
    }

    Level::delete_by_id(level_id).exec(db).await?;
    info!(level_id, "Deleted level");
    Ok(())
}
