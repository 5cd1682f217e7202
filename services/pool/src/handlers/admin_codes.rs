use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use ekpool_domain::code::parse_code_list;
use ekpool_domain::family::Family;

use crate::domain::types::{CodeCounts, Pool};
use crate::error::PoolServiceError;
use crate::handlers::{Caller, require_admin};
use crate::state::AppState;
use crate::usecase::pool_admin::{
    AddCodesInput, AddCodesReport, AddCodesUseCase, DeleteCodeUseCase, DeleteCodesReport,
    DeleteCodesUseCase, GetCountsUseCase, GetPoolsUseCase,
};

// ── Request types ────────────────────────────────────────────────────────────

/// Codes may be given as a list, as free text, or both.
#[derive(Deserialize)]
pub struct AddCodesRequest {
    pub family: Family,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub codes: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteCodesRequest {
    pub text: String,
}

// ── GET /admin/pools ─────────────────────────────────────────────────────────

pub async fn get_pools(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<Family, Pool>>, PoolServiceError> {
    require_admin(caller)?;
    let uc = GetPoolsUseCase {
        ledger: state.code_ledger(),
    };
    Ok(Json(uc.execute().await?))
}

// ── GET /admin/counts ────────────────────────────────────────────────────────

pub async fn get_counts(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<CodeCounts>, PoolServiceError> {
    require_admin(caller)?;
    let uc = GetCountsUseCase {
        ledger: state.code_ledger(),
    };
    Ok(Json(uc.execute().await?))
}

// ── POST /admin/codes ────────────────────────────────────────────────────────

pub async fn add_codes(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<AddCodesRequest>,
) -> Result<Json<AddCodesReport>, PoolServiceError> {
    let actor = require_admin(caller)?;
    let mut codes = body.codes;
    if let Some(text) = body.text.as_deref() {
        codes.extend(parse_code_list(text));
    }
    let uc = AddCodesUseCase {
        ledger: state.code_ledger(),
        catalog: state.catalog.clone(),
    };
    let report = uc
        .execute(
            actor,
            AddCodesInput {
                family: body.family,
                country: body.country,
                codes,
            },
        )
        .await?;
    Ok(Json(report))
}

// ── DELETE /admin/codes/{code} ───────────────────────────────────────────────

pub async fn delete_code(
    caller: Caller,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, PoolServiceError> {
    let actor = require_admin(caller)?;
    let uc = DeleteCodeUseCase {
        ledger: state.code_ledger(),
    };
    uc.execute(actor, &code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /admin/codes/delete ─────────────────────────────────────────────────

pub async fn delete_codes(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<DeleteCodesRequest>,
) -> Result<Json<DeleteCodesReport>, PoolServiceError> {
    let actor = require_admin(caller)?;
    let uc = DeleteCodesUseCase {
        ledger: state.code_ledger(),
    };
    Ok(Json(uc.execute(actor, &body.text).await?))
}
