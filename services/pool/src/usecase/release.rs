use ekpool_domain::code::normalize_code;

use crate::domain::repository::CodeLedger;
use crate::domain::types::{Actor, Disposition, ReturnOutcome};
use crate::error::PoolServiceError;

// ── ReturnCode (release / clear) ─────────────────────────────────────────────

pub struct ReturnCodeUseCase<L: CodeLedger> {
    pub ledger: L,
}

impl<L: CodeLedger> ReturnCodeUseCase<L> {
    pub async fn execute(
        &self,
        actor: Actor,
        code: &str,
        disposition: Disposition,
    ) -> Result<(), PoolServiceError> {
        let code =
            normalize_code(code).ok_or_else(|| PoolServiceError::validation("code must not be empty"))?;
        let disposition = match disposition {
            Disposition::Release { note } => Disposition::Release {
                note: note
                    .map(|n| n.trim().to_owned())
                    .filter(|n| !n.is_empty()),
            },
            Disposition::Clear { clearance_id } => {
                let clearance_id = clearance_id.trim();
                if clearance_id.is_empty() {
                    return Err(PoolServiceError::validation(
                        "clearance_id must not be empty",
                    ));
                }
                Disposition::Clear {
                    clearance_id: clearance_id.to_owned(),
                }
            }
        };

        match self
            .ledger
            .return_reserved(&code, &disposition, &actor)
            .await?
        {
            ReturnOutcome::Returned => {
                let kind = match disposition {
                    Disposition::Release { .. } => "released",
                    Disposition::Clear { .. } => "cleared",
                };
                tracing::info!(code = %code, action = "RELEASED", kind, by = %actor.user_name, "code returned");
                Ok(())
            }
            ReturnOutcome::NotReserved => Err(PoolServiceError::NotReserved),
            ReturnOutcome::NotFound => Err(PoolServiceError::NotFound),
        }
    }
}
