use crate::domain::repository::CodeLedger;
use crate::domain::types::HeldCode;
use crate::error::PoolServiceError;

pub struct GetMyCodesUseCase<L: CodeLedger> {
    pub ledger: L,
}

impl<L: CodeLedger> GetMyCodesUseCase<L> {
    pub async fn execute(&self, user_id: i64) -> Result<Vec<HeldCode>, PoolServiceError> {
        let mut held = self.ledger.held_by(user_id).await?;
        held.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(held)
    }
}
