use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use ekpool_domain::code::{normalize_code, parse_code_list};
use ekpool_domain::country::CountryCatalog;
use ekpool_domain::family::Family;

use crate::domain::repository::CodeLedger;
use crate::domain::types::{Actor, CodeCounts, InsertOutcome, NewCode, Pool};
use crate::error::PoolServiceError;
use crate::usecase::reserve::resolve_country;

/// Why a single code in a batch was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Invalid,
    Duplicate,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub code: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddCodesReport {
    pub inserted: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteCodesReport {
    pub deleted: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

// ── GetPools ─────────────────────────────────────────────────────────────────

pub struct GetPoolsUseCase<L: CodeLedger> {
    pub ledger: L,
}

impl<L: CodeLedger> GetPoolsUseCase<L> {
    pub async fn execute(&self) -> Result<BTreeMap<Family, Pool>, PoolServiceError> {
        let mut pools = self.ledger.pools().await?;
        for family in Family::ALL {
            pools.entry(family).or_default();
        }
        Ok(pools)
    }
}

// ── GetCounts ────────────────────────────────────────────────────────────────

pub struct GetCountsUseCase<L: CodeLedger> {
    pub ledger: L,
}

impl<L: CodeLedger> GetCountsUseCase<L> {
    pub async fn execute(&self) -> Result<CodeCounts, PoolServiceError> {
        self.ledger.counts().await
    }
}

// ── AddCodes ─────────────────────────────────────────────────────────────────

pub struct AddCodesInput {
    pub family: Family,
    pub country: Option<String>,
    pub codes: Vec<String>,
}

pub struct AddCodesUseCase<L: CodeLedger> {
    pub ledger: L,
    pub catalog: Arc<CountryCatalog>,
}

impl<L: CodeLedger> AddCodesUseCase<L> {
    /// Each code is inserted on its own; a failure never undoes earlier inserts.
    pub async fn execute(
        &self,
        actor: Actor,
        input: AddCodesInput,
    ) -> Result<AddCodesReport, PoolServiceError> {
        if input.codes.is_empty() {
            return Err(PoolServiceError::validation("no codes supplied"));
        }
        let country = if input.family.requires_country() {
            resolve_country(&self.catalog, input.family, input.country.as_deref())?
                .map(|e| e.name.clone())
        } else {
            None
        };
        let note = format!(
            "{} / {}",
            input.family,
            country.as_deref().unwrap_or("ANY")
        );

        let mut report = AddCodesReport::default();
        for raw in input.codes {
            let Some(code) = normalize_code(&raw) else {
                report.failed.push(BatchFailure {
                    code: raw,
                    reason: FailureReason::Invalid,
                });
                continue;
            };
            let new_code = NewCode {
                code,
                family: input.family,
                country: country.clone(),
            };
            match self.ledger.insert_available(&new_code, &actor, &note).await? {
                InsertOutcome::Inserted => {
                    tracing::info!(code = %new_code.code, family = %new_code.family, action = "ADDED", "code added");
                    report.inserted.push(new_code.code);
                }
                InsertOutcome::Duplicate => report.failed.push(BatchFailure {
                    code: new_code.code,
                    reason: FailureReason::Duplicate,
                }),
            }
        }
        Ok(report)
    }
}

// ── DeleteCode ───────────────────────────────────────────────────────────────

pub struct DeleteCodeUseCase<L: CodeLedger> {
    pub ledger: L,
}

impl<L: CodeLedger> DeleteCodeUseCase<L> {
    pub async fn execute(&self, actor: Actor, code: &str) -> Result<(), PoolServiceError> {
        let code = normalize_code(code).ok_or(PoolServiceError::NotFound)?;
        if !self.ledger.remove(&code, &actor).await? {
            return Err(PoolServiceError::NotFound);
        }
        tracing::info!(code = %code, action = "DELETED", "code deleted");
        Ok(())
    }
}

// ── DeleteCodes (bulk text) ──────────────────────────────────────────────────

pub struct DeleteCodesUseCase<L: CodeLedger> {
    pub ledger: L,
}

impl<L: CodeLedger> DeleteCodesUseCase<L> {
    pub async fn execute(
        &self,
        actor: Actor,
        text: &str,
    ) -> Result<DeleteCodesReport, PoolServiceError> {
        let tokens = parse_code_list(text);
        if tokens.is_empty() {
            return Err(PoolServiceError::validation("no codes supplied"));
        }
        let mut report = DeleteCodesReport::default();
        for token in tokens {
            let Some(code) = normalize_code(&token) else {
                continue;
            };
            if self.ledger.remove(&code, &actor).await? {
                tracing::info!(code = %code, action = "DELETED", "code deleted");
                report.deleted.push(code);
            } else {
                report.failed.push(BatchFailure {
                    code,
                    reason: FailureReason::NotFound,
                });
            }
        }
        Ok(report)
    }
}
