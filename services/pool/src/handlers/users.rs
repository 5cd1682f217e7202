use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{NewUser, User, UserPatch};
use crate::error::PoolServiceError;
use crate::handlers::{Caller, HeldCodeResponse, require_admin};
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserUseCase, DeleteUserUseCase, GetUserUseCase, ListMembersUseCase, MemberSummary,
    UpdateUserUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// A user account. The stored password hash is never returned.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub team_name: String,
    pub user_name: String,
    pub contact_email: String,
    pub is_admin: bool,
    #[serde(serialize_with = "ekpool_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            team_name: u.team_name,
            user_name: u.user_name,
            contact_email: u.contact_email,
            is_admin: u.is_admin,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct MemberResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub reserved_codes: Vec<HeldCodeResponse>,
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub team_name: String,
    pub user_name: String,
    pub contact_email: String,
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub team_name: Option<String>,
    pub user_name: Option<String>,
    pub contact_email: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

// ── GET /admin/users ─────────────────────────────────────────────────────────

pub async fn list_members(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberResponse>>, PoolServiceError> {
    require_admin(caller)?;
    let uc = ListMembersUseCase {
        users: state.user_repo(),
        ledger: state.code_ledger(),
    };
    let members = uc.execute().await?;
    Ok(Json(
        members
            .into_iter()
            .map(|MemberSummary { user, held }| MemberResponse {
                user: user.into(),
                reserved_codes: held
                    .into_iter()
                    .map(|h| HeldCodeResponse::new(h, &state.catalog))
                    .collect(),
            })
            .collect(),
    ))
}

// ── POST /admin/users ────────────────────────────────────────────────────────

pub async fn create_user(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), PoolServiceError> {
    require_admin(caller)?;
    let uc = CreateUserUseCase {
        users: state.user_repo(),
    };
    let user = uc
        .execute(NewUser {
            team_name: body.team_name,
            user_name: body.user_name,
            contact_email: body.contact_email,
            password_hash: body.password_hash,
            is_admin: body.is_admin,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /admin/users/{id} ────────────────────────────────────────────────────

pub async fn get_user(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, PoolServiceError> {
    require_admin(caller)?;
    let uc = GetUserUseCase {
        users: state.user_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── PATCH /admin/users/{id} ──────────────────────────────────────────────────

pub async fn update_user(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, PoolServiceError> {
    require_admin(caller)?;
    let uc = UpdateUserUseCase {
        users: state.user_repo(),
    };
    let user = uc
        .execute(
            id,
            UserPatch {
                team_name: body.team_name,
                user_name: body.user_name,
                contact_email: body.contact_email,
                password_hash: body.password_hash,
                is_admin: body.is_admin,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── DELETE /admin/users/{id} ─────────────────────────────────────────────────

pub async fn delete_user(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, PoolServiceError> {
    require_admin(caller)?;
    let uc = DeleteUserUseCase {
        users: state.user_repo(),
    };
    uc.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
