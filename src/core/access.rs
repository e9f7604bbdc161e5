//! Access gate - resolves the calling user and checks roles.
//!
//! Nothing else in `core` performs authorization; the API layer calls
//! [`require_role`] before handing off to the ledger or lifecycle functions.

use crate::{
    core::user,
    entities::Role,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::warn;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

/// Loads the caller from the store. Unknown and inactive users are unauthenticated.
pub async fn resolve_caller(db: &DatabaseConnection, user_id: i64) -> Result<Caller> {
    match user::get_user(db, user_id).await? {
        Some(found) if found.is_active => Ok(Caller {
            user_id: found.id,
            role: found.role,
        }),
        _ => {
            warn!(user_id, "Rejected unknown or inactive caller");
            Err(Error::Unauthenticated)
        }
    }
}

/// Fails with `Forbidden` unless the caller holds one of `allowed`.
pub fn require_role(caller: &Caller, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&caller.role) {
        return Ok(());
    }
    warn!(user_id = caller.user_id, role = ?caller.role, "Forbidden");
    let required = allowed
        .iter()
        .map(|role| format!("{role:?}").to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::Forbidden { required })
}
