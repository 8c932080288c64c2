//! `/v1/users` handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use store::{Account, StoreError};
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::models::{Role, RolesRequest, SigninRequest, SignupRequest, SignupResponse, UserInfo};
use crate::state::AppState;
use crate::users::UserServiceError;
use crate::validation::validate_signup;

/// `POST /v1/users/signup`
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(req) = payload?;
    let input = validate_signup(&req).map_err(ApiError::Validation)?;
    let response = state.signup.run(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /v1/users/signin`
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<UserInfo>, ApiError> {
    let Json(req) = payload?;
    let account = state
        .users
        .authenticate(&req.username, &req.password)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::InvalidCredentials)?;

    auth::sign_in(&session, account.id).await?;
    info!(user_id = %account.id, "signed in");

    Ok(Json(UserInfo::from(&account)))
}

/// `POST /v1/users/signout`
pub async fn signout(session: Session) -> Result<StatusCode, ApiError> {
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Account bound to the session. A session pointing at a deleted account is
/// flushed.
async fn signed_in_account(state: &AppState, session: &Session) -> Result<Account, ApiError> {
    let Some(user_id) = auth::session_user_id(session).await? else {
        return Err(ApiError::Unauthorized);
    };

    let account = state
        .users
        .get_user_by_id(user_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    match account {
        Some(account) => Ok(account),
        None => {
            session.flush().await?;
            Err(ApiError::Unauthorized)
        }
    }
}

/// `GET /v1/users/me`
pub async fn current_user(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<UserInfo>, ApiError> {
    let account = signed_in_account(&state, &session).await?;
    Ok(Json(UserInfo::from(&account)))
}

/// `PUT /v1/users/{id}/roles`, admin only.
pub async fn set_roles(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    payload: Result<Json<RolesRequest>, JsonRejection>,
) -> Result<Json<UserInfo>, ApiError> {
    let admin = signed_in_account(&state, &session).await?;
    if !UserInfo::from(&admin).has_role(Role::Admin) {
        return Err(ApiError::Forbidden);
    }
    let Json(req) = payload?;

    let account = state
        .users
        .set_roles(id, &req.roles)
        .await
        .map_err(|e| match e {
            UserServiceError::Store(StoreError::NotFound(_)) => ApiError::UserNotFound,
            other => ApiError::Internal(other.to_string()),
        })?;
    info!(admin_id = %admin.id, user_id = %id, roles = ?account.roles, "roles updated");

    Ok(Json(UserInfo::from(&account)))
}
