use std::sync::Arc;

use ekpool_domain::country::{CountryCatalog, CountryEntry};
use ekpool_domain::family::Family;

use crate::domain::repository::CodeLedger;
use crate::domain::types::{Actor, Claim, HeldCode};
use crate::error::PoolServiceError;

/// Resolve a submitted country against the catalog.
///
/// Blank input is treated as absent. Country-scoped families reject an absent
/// country; any supplied country must be recognized.
pub(crate) fn resolve_country<'a>(
    catalog: &'a CountryCatalog,
    family: Family,
    country: Option<&str>,
) -> Result<Option<&'a CountryEntry>, PoolServiceError> {
    let country = country.map(str::trim).filter(|c| !c.is_empty());
    match country {
        Some(c) => catalog
            .lookup(c)
            .map(Some)
            .ok_or_else(|| PoolServiceError::InvalidCountry(c.to_owned())),
        None if family.requires_country() => Err(PoolServiceError::InvalidCountry(String::new())),
        None => Ok(None),
    }
}

pub struct ReserveCodeInput {
    pub family: Family,
    pub country: Option<String>,
    pub tester_name: String,
}

pub struct ReserveCodeUseCase<L: CodeLedger> {
    pub ledger: L,
    pub catalog: Arc<CountryCatalog>,
}

impl<L: CodeLedger> ReserveCodeUseCase<L> {
    pub async fn execute(
        &self,
        actor: Actor,
        input: ReserveCodeInput,
    ) -> Result<HeldCode, PoolServiceError> {
        let tester_name = input.tester_name.trim();
        if tester_name.is_empty() {
            return Err(PoolServiceError::validation("tester_name must not be empty"));
        }
        let entry = resolve_country(&self.catalog, input.family, input.country.as_deref())?;

        let claim = Claim {
            family: input.family,
            country: entry.map(|e| e.name.clone()),
            region: entry.map(|e| e.region),
            tester_name: tester_name.to_owned(),
            actor,
        };

        match self.ledger.claim_available(&claim).await? {
            Some(held) => {
                tracing::info!(
                    code = %held.code,
                    family = %held.family,
                    action = "RESERVED",
                    holder = %held.holder_name,
                    "code reserved"
                );
                Ok(held)
            }
            None => {
                tracing::warn!(
                    family = %claim.family,
                    country = claim.country.as_deref().unwrap_or("ANY"),
                    "reservation rejected: pool empty"
                );
                Err(PoolServiceError::OutOfStock)
            }
        }
    }
}
