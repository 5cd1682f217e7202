#![allow(async_fn_in_trait)]

use std::collections::BTreeMap;

use ekpool_domain::family::Family;
use ekpool_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Actor, AuditEntry, AuditFilter, Claim, CodeCounts, DateBounds, DeleteUserOutcome, Disposition,
    HeldCode, InsertOutcome, NewCode, NewUser, Pool, ReturnOutcome, User, UserPatch,
};
use crate::error::PoolServiceError;

/// Pool store. Every mutating method moves exactly one code and appends
/// exactly one audit entry in the same atomic step.
pub trait CodeLedger: Send + Sync {
    /// Every family is present, possibly with empty sequences.
    async fn pools(&self) -> Result<BTreeMap<Family, Pool>, PoolServiceError>;

    async fn counts(&self) -> Result<CodeCounts, PoolServiceError>;

    /// Move the first matching available code to reserved. `None` when the
    /// selection is empty.
    async fn claim_available(&self, claim: &Claim) -> Result<Option<HeldCode>, PoolServiceError>;

    async fn return_reserved(
        &self,
        code: &str,
        disposition: &Disposition,
        actor: &Actor,
    ) -> Result<ReturnOutcome, PoolServiceError>;

    /// Insert at the end of the family's available sequence; `note` goes on the
    /// ADDED entry.
    async fn insert_available(
        &self,
        code: &NewCode,
        actor: &Actor,
        note: &str,
    ) -> Result<InsertOutcome, PoolServiceError>;

    /// Hard-delete a code in any state. Returns `false` if it did not exist.
    async fn remove(&self, code: &str, actor: &Actor) -> Result<bool, PoolServiceError>;

    /// Reserved codes held by `user_id`, newest reservation first.
    async fn held_by(&self, user_id: i64) -> Result<Vec<HeldCode>, PoolServiceError>;
}

/// Read side of the audit trail. Appends happen only through [`CodeLedger`].
pub trait AuditLogRepository: Send + Sync {
    /// Newest first (`logged_at` desc, `id` desc).
    async fn query(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PoolServiceError>;

    async fn date_bounds(&self) -> Result<DateBounds, PoolServiceError>;
}

/// Repository for team accounts.
pub trait UserRepository: Send + Sync {
    /// Non-admin users ordered by id.
    async fn list_members(&self) -> Result<Vec<User>, PoolServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, PoolServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PoolServiceError>;
    /// Fails with `UserAlreadyExists` on a duplicate e-mail.
    async fn create(&self, user: &NewUser) -> Result<User, PoolServiceError>;
    /// Returns `None` if the user does not exist.
    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, PoolServiceError>;
    /// Delete unless the user still holds reserved codes.
    async fn delete_unless_holding(&self, id: i64) -> Result<DeleteUserOutcome, PoolServiceError>;
}
