//! User business logic - account creation, lookup, updates, and deactivation.
//!
//! Hard deletion lives in [`crate::core::lifecycle::delete_user`] because it cascades
//! through enrollments and payments.

use crate::{
    core::DEFAULT_PAGE_SIZE,
    entities::{Role, User, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, SqlErr, prelude::*};
use tracing::info;

/// Input for [`create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email; trimmed and lowercased before storage
    pub email: String,
    /// Opaque hash from the authentication service
    pub password_hash: String,
    /// Display name
    pub full_name: String,
    /// Optional contact number
    pub phone_number: Option<String>,
    /// Role granted to the account
    pub role: Role,
}

/// Mutable user fields. Anything not listed here (email, role, timestamps) cannot be
/// changed through an update.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name
    pub full_name: Option<String>,
    /// New contact number; `Some(None)` clears it
    pub phone_number: Option<Option<String>>,
    /// Re-activate or deactivate the account
    pub is_active: Option<bool>,
}

/// Filter for [`list_users`].
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Only users with this role
    pub role: Option<Role>,
    /// Only active or only inactive users
    pub is_active: Option<bool>,
    /// Rows to skip
    pub offset: u64,
    /// Maximum rows to return; `None` for [`DEFAULT_PAGE_SIZE`]
    pub limit: Option<u64>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates a new active user. Emails are unique case-insensitively.
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let email = normalize_email(&new_user.email);
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("A valid email is required"));
    }
    if new_user.full_name.trim().is_empty() {
        return Err(Error::validation("Full name cannot be empty"));
    }

    if User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::EmailTaken { email });
    }

    let now = Utc::now();
    let model = user::ActiveModel {
        email: Set(email.clone()),
        password_hash: Set(new_user.password_hash),
        role: Set(new_user.role),
        full_name: Set(new_user.full_name.trim().to_string()),
        phone_number: Set(new_user.phone_number),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::EmailTaken {
            email: email.clone(),
        },
        _ => Error::from(e),
    })?;
    info!(user_id = created.id, role = ?created.role, "Created user");
    Ok(created)
}

/// Finds a user by id.
pub async fn get_user<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Lists users ordered by id.
pub async fn list_users(db: &DatabaseConnection, filter: &UserFilter) -> Result<Vec<user::Model>> {
    let mut query = User::find().order_by_asc(user::Column::Id);
    if let Some(role) = filter.role {
        query = query.filter(user::Column::Role.eq(role));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(user::Column::IsActive.eq(is_active));
    }
    query
        .offset(filter.offset)
        .limit(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a [`UserUpdate`] field by field.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    update: UserUpdate,
) -> Result<user::Model> {
    let existing = get_user(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let mut active: user::ActiveModel = existing.into();
    if let Some(full_name) = update.full_name {
        if full_name.trim().is_empty() {
            return Err(Error::validation("Full name cannot be empty"));
        }
        active.full_name = Set(full_name.trim().to_string());
    }
    if let Some(phone_number) = update.phone_number {
        active.phone_number = Set(phone_number);
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}

/// Soft-deactivates a user. Enrollments and payments are left untouched.
pub async fn deactivate_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    let updated = update_user(
        db,
        user_id,
        UserUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;
    info!(user_id, "Deactivated user");
    Ok(updated)
}
