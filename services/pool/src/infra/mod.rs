pub mod db;
pub mod memory;

use std::collections::BTreeMap;

use sea_orm::DatabaseConnection;

use ekpool_domain::family::Family;
use ekpool_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AuditLogRepository, CodeLedger, UserRepository};
use crate::domain::types::{
    Actor, AuditEntry, AuditFilter, Claim, CodeCounts, DateBounds, DeleteUserOutcome, Disposition,
    HeldCode, InsertOutcome, NewCode, NewUser, Pool, ReturnOutcome, User, UserPatch,
};
use crate::error::PoolServiceError;
use crate::infra::db::{DbAuditLogRepository, DbCodeLedger, DbUserRepository};
use crate::infra::memory::MemoryStore;

/// Storage selected at startup: PostgreSQL when `DATABASE_URL` is set,
/// otherwise the in-memory store.
#[derive(Clone)]
pub enum StoreBackend {
    Postgres(DatabaseConnection),
    Memory(MemoryStore),
}

/// Repository a call is routed to.
enum Target<'a, D> {
    Postgres(D),
    Memory(&'a MemoryStore),
}

impl StoreBackend {
    fn ledger(&self) -> Target<'_, DbCodeLedger> {
        match self {
            Self::Postgres(db) => Target::Postgres(DbCodeLedger { db: db.clone() }),
            Self::Memory(store) => Target::Memory(store),
        }
    }

    fn audit_log(&self) -> Target<'_, DbAuditLogRepository> {
        match self {
            Self::Postgres(db) => Target::Postgres(DbAuditLogRepository { db: db.clone() }),
            Self::Memory(store) => Target::Memory(store),
        }
    }

    fn users(&self) -> Target<'_, DbUserRepository> {
        match self {
            Self::Postgres(db) => Target::Postgres(DbUserRepository { db: db.clone() }),
            Self::Memory(store) => Target::Memory(store),
        }
    }
}

impl CodeLedger for StoreBackend {
    async fn pools(&self) -> Result<BTreeMap<Family, Pool>, PoolServiceError> {
        match self.ledger() {
            Target::Postgres(db) => db.pools().await,
            Target::Memory(mem) => mem.pools().await,
        }
    }

    async fn counts(&self) -> Result<CodeCounts, PoolServiceError> {
        match self.ledger() {
            Target::Postgres(db) => db.counts().await,
            Target::Memory(mem) => mem.counts().await,
        }
    }

    async fn claim_available(&self, claim: &Claim) -> Result<Option<HeldCode>, PoolServiceError> {
        match self.ledger() {
            Target::Postgres(db) => db.claim_available(claim).await,
            Target::Memory(mem) => mem.claim_available(claim).await,
        }
    }

    async fn return_reserved(
        &self,
        code: &str,
        disposition: &Disposition,
        actor: &Actor,
    ) -> Result<ReturnOutcome, PoolServiceError> {
        match self.ledger() {
            Target::Postgres(db) => db.return_reserved(code, disposition, actor).await,
            Target::Memory(mem) => mem.return_reserved(code, disposition, actor).await,
        }
    }

    async fn insert_available(
        &self,
        code: &NewCode,
        actor: &Actor,
        note: &str,
    ) -> Result<InsertOutcome, PoolServiceError> {
        match self.ledger() {
            Target::Postgres(db) => db.insert_available(code, actor, note).await,
            Target::Memory(mem) => mem.insert_available(code, actor, note).await,
        }
    }

    async fn remove(&self, code: &str, actor: &Actor) -> Result<bool, PoolServiceError> {
        match self.ledger() {
            Target::Postgres(db) => db.remove(code, actor).await,
            Target::Memory(mem) => mem.remove(code, actor).await,
        }
    }

    async fn held_by(&self, user_id: i64) -> Result<Vec<HeldCode>, PoolServiceError> {
        match self.ledger() {
            Target::Postgres(db) => db.held_by(user_id).await,
            Target::Memory(mem) => mem.held_by(user_id).await,
        }
    }
}

impl AuditLogRepository for StoreBackend {
    async fn query(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PoolServiceError> {
        match self.audit_log() {
            Target::Postgres(db) => db.query(filter, page).await,
            Target::Memory(mem) => mem.query(filter, page).await,
        }
    }

    async fn date_bounds(&self) -> Result<DateBounds, PoolServiceError> {
        match self.audit_log() {
            Target::Postgres(db) => db.date_bounds().await,
            Target::Memory(mem) => mem.date_bounds().await,
        }
    }
}

impl UserRepository for StoreBackend {
    async fn list_members(&self) -> Result<Vec<User>, PoolServiceError> {
        match self.users() {
            Target::Postgres(db) => db.list_members().await,
            Target::Memory(mem) => mem.list_members().await,
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, PoolServiceError> {
        match self.users() {
            Target::Postgres(db) => db.find_by_id(id).await,
            Target::Memory(mem) => mem.find_by_id(id).await,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PoolServiceError> {
        match self.users() {
            Target::Postgres(db) => db.find_by_email(email).await,
            Target::Memory(mem) => mem.find_by_email(email).await,
        }
    }

    async fn create(&self, user: &NewUser) -> Result<User, PoolServiceError> {
        match self.users() {
            Target::Postgres(db) => db.create(user).await,
            Target::Memory(mem) => mem.create(user).await,
        }
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, PoolServiceError> {
        match self.users() {
            Target::Postgres(db) => db.update(id, patch).await,
            Target::Memory(mem) => mem.update(id, patch).await,
        }
    }

    async fn delete_unless_holding(&self, id: i64) -> Result<DeleteUserOutcome, PoolServiceError> {
        match self.users() {
            Target::Postgres(db) => db.delete_unless_holding(id).await,
            Target::Memory(mem) => mem.delete_unless_holding(id).await,
        }
    }
}
