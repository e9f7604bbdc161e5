//! Request extractors for the calling user.
//!
//! Identity comes from the upstream authentication layer as the `x-user-id`
//! header. [`CurrentUser`] resolves it against the store; the `Require*`
//! wrappers add the role check, so a handler that takes `RequireAdmin` never
//! runs for anyone else.

use super::AppState;
use crate::{
    core::access::{self, Caller},
    entities::Role,
    errors::Error,
};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Any authenticated, active user.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Caller);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or(Error::Unauthenticated)?;

        let caller = access::resolve_caller(&state.db, user_id).await?;
        Ok(Self(caller))
    }
}

async fn caller_with_role(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[Role],
) -> Result<Caller, Error> {
    let CurrentUser(caller) = CurrentUser::from_request_parts(parts, state).await?;
    access::require_role(&caller, allowed)?;
    Ok(caller)
}

/// Requires the `ADMIN` role.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub Caller);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_with_role(parts, state, &[Role::Admin]).await.map(Self)
    }
}

/// Requires the `STUDENT` role.
#[derive(Debug, Clone, Copy)]
pub struct RequireStudent(pub Caller);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_with_role(parts, state, &[Role::Student]).await.map(Self)
    }
}

/// Requires the `TEACHER` role.
#[derive(Debug, Clone, Copy)]
pub struct RequireTeacher(pub Caller);

impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_with_role(parts, state, &[Role::Teacher]).await.map(Self)
    }
}
