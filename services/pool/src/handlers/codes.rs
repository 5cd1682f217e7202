use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use ekpool_domain::family::Family;

use crate::domain::types::Disposition;
use crate::error::PoolServiceError;
use crate::handlers::{Caller, HeldCodeResponse, require_member};
use crate::state::AppState;
use crate::usecase::my_codes::GetMyCodesUseCase;
use crate::usecase::release::ReturnCodeUseCase;
use crate::usecase::reserve::{ReserveCodeInput, ReserveCodeUseCase};

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReserveRequest {
    pub family: Family,
    #[serde(default)]
    pub country: Option<String>,
    pub tester_name: String,
}

/// Body of `POST /codes/{code}/return`. The `kind` tag is mandatory.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReturnRequest {
    Release {
        #[serde(default)]
        note: Option<String>,
    },
    Clear {
        clearance_id: String,
    },
}

impl From<ReturnRequest> for Disposition {
    fn from(req: ReturnRequest) -> Self {
        match req {
            ReturnRequest::Release { note } => Disposition::Release { note },
            ReturnRequest::Clear { clearance_id } => Disposition::Clear { clearance_id },
        }
    }
}

// ── POST /codes/reserve ──────────────────────────────────────────────────────

pub async fn reserve_code(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<HeldCodeResponse>), PoolServiceError> {
    let actor = require_member(caller)?;
    let uc = ReserveCodeUseCase {
        ledger: state.code_ledger(),
        catalog: state.catalog.clone(),
    };
    let held = uc
        .execute(
            actor,
            ReserveCodeInput {
                family: body.family,
                country: body.country,
                tester_name: body.tester_name,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(HeldCodeResponse::new(held, &state.catalog)),
    ))
}

// ── POST /codes/{code}/return ────────────────────────────────────────────────

pub async fn return_code(
    caller: Caller,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<ReturnRequest>,
) -> Result<StatusCode, PoolServiceError> {
    let actor = require_member(caller)?;
    let uc = ReturnCodeUseCase {
        ledger: state.code_ledger(),
    };
    uc.execute(actor, &code, body.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /codes/@me ───────────────────────────────────────────────────────────

pub async fn get_my_codes(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<HeldCodeResponse>>, PoolServiceError> {
    let actor = require_member(caller)?;
    let uc = GetMyCodesUseCase {
        ledger: state.code_ledger(),
    };
    let held = uc.execute(actor.user_id).await?;
    Ok(Json(
        held.into_iter()
            .map(|h| HeldCodeResponse::new(h, &state.catalog))
            .collect(),
    ))
}
