use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};

use ekpool_domain::country::CountryCatalog;
use ekpool_domain::family::Family;
use ekpool_pool::domain::repository::{CodeLedger, UserRepository};
use ekpool_pool::domain::types::{
    Actor, Claim, CodeCounts, DeleteUserOutcome, Disposition, HeldCode, InsertOutcome, NewCode,
    NewUser, Pool, ReturnOutcome, User, UserPatch,
};
use ekpool_pool::error::PoolServiceError;
use ekpool_pool::infra::StoreBackend;
use ekpool_pool::infra::memory::MemoryStore;
use ekpool_pool::router::build_router;
use ekpool_pool::state::AppState;
use ekpool_testing::auth::TEST_TOKEN_SECRET;

pub fn actor(user_id: i64, user_name: &str) -> Actor {
    Actor {
        user_id,
        user_name: user_name.to_owned(),
    }
}

pub fn catalog() -> Arc<CountryCatalog> {
    Arc::new(CountryCatalog::builtin())
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn held_code(code: &str, holder_id: i64, requested_at: DateTime<Utc>) -> HeldCode {
    HeldCode {
        code: code.to_owned(),
        family: Family::Hsv,
        country: Some("Germany".to_owned()),
        tester_name: "Alice".to_owned(),
        holder_id,
        holder_name: "team-a".to_owned(),
        requested_at,
    }
}

pub fn new_user(user_name: &str, email: &str) -> NewUser {
    NewUser {
        team_name: format!("Team {user_name}"),
        user_name: user_name.to_owned(),
        contact_email: email.to_owned(),
        password_hash: "$argon2id$stub".to_owned(),
        is_admin: false,
    }
}

/// Seed `codes` into a store through the ledger, as an admin would.
pub async fn seed(store: &MemoryStore, family: Family, country: Option<&str>, codes: &[&str]) {
    for code in codes {
        let outcome = store
            .insert_available(
                &NewCode {
                    code: (*code).to_owned(),
                    family,
                    country: country.map(str::to_owned),
                },
                &actor(100, "admin"),
                "seed",
            )
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);
    }
}

// ── Test server ──────────────────────────────────────────────────────────────

/// Router over a fresh in-memory store. The returned store shares state with
/// the server so tests can seed and inspect it directly.
pub fn test_server() -> (TestServer, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(
        StoreBackend::Memory(store.clone()),
        CountryCatalog::builtin(),
        TEST_TOKEN_SECRET,
    );
    let server = TestServer::new(build_router(state)).unwrap();
    (server, store)
}

// ── MockCodeLedger ───────────────────────────────────────────────────────────

/// Ledger double that records every call and answers from canned values.
pub struct MockCodeLedger {
    pub claims: Arc<Mutex<Vec<Claim>>>,
    pub returns: Arc<Mutex<Vec<(String, Disposition)>>>,
    pub next_held: Mutex<Option<HeldCode>>,
    pub return_outcome: ReturnOutcome,
    pub held: Vec<HeldCode>,
}

impl MockCodeLedger {
    pub fn empty() -> Self {
        Self {
            claims: Arc::new(Mutex::new(vec![])),
            returns: Arc::new(Mutex::new(vec![])),
            next_held: Mutex::new(None),
            return_outcome: ReturnOutcome::Returned,
            held: vec![],
        }
    }

    pub fn with_next(held: HeldCode) -> Self {
        let ledger = Self::empty();
        *ledger.next_held.lock().unwrap() = Some(held);
        ledger
    }

    pub fn returning(outcome: ReturnOutcome) -> Self {
        Self {
            return_outcome: outcome,
            ..Self::empty()
        }
    }

    pub fn holding(held: Vec<HeldCode>) -> Self {
        Self {
            held,
            ..Self::empty()
        }
    }

    pub fn claims_handle(&self) -> Arc<Mutex<Vec<Claim>>> {
        Arc::clone(&self.claims)
    }

    pub fn returns_handle(&self) -> Arc<Mutex<Vec<(String, Disposition)>>> {
        Arc::clone(&self.returns)
    }
}

impl CodeLedger for MockCodeLedger {
    async fn pools(&self) -> Result<BTreeMap<Family, Pool>, PoolServiceError> {
        Ok(BTreeMap::new())
    }

    async fn counts(&self) -> Result<CodeCounts, PoolServiceError> {
        Ok(CodeCounts::default())
    }

    async fn claim_available(&self, claim: &Claim) -> Result<Option<HeldCode>, PoolServiceError> {
        self.claims.lock().unwrap().push(claim.clone());
        Ok(self.next_held.lock().unwrap().take())
    }

    async fn return_reserved(
        &self,
        code: &str,
        disposition: &Disposition,
        _actor: &Actor,
    ) -> Result<ReturnOutcome, PoolServiceError> {
        self.returns
            .lock()
            .unwrap()
            .push((code.to_owned(), disposition.clone()));
        Ok(self.return_outcome)
    }

    async fn insert_available(
        &self,
        _code: &NewCode,
        _actor: &Actor,
        _note: &str,
    ) -> Result<InsertOutcome, PoolServiceError> {
        Ok(InsertOutcome::Inserted)
    }

    async fn remove(&self, _code: &str, _actor: &Actor) -> Result<bool, PoolServiceError> {
        Ok(false)
    }

    async fn held_by(&self, user_id: i64) -> Result<Vec<HeldCode>, PoolServiceError> {
        Ok(self
            .held
            .iter()
            .filter(|h| h.holder_id == user_id)
            .cloned()
            .collect())
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

pub fn test_user(id: i64, email: &str) -> User {
    User {
        id,
        team_name: format!("Team {id}"),
        user_name: format!("team-{id}"),
        contact_email: email.to_owned(),
        is_admin: false,
        password_hash: "$argon2id$stub".to_owned(),
        created_at: at(2025, 1, 1, 0),
    }
}

impl UserRepository for MockUserRepo {
    async fn list_members(&self) -> Result<Vec<User>, PoolServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !u.is_admin)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, PoolServiceError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PoolServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.contact_email == email)
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, PoolServiceError> {
        let mut users = self.users.lock().unwrap();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = User {
            id,
            team_name: user.team_name.clone(),
            user_name: user.user_name.clone(),
            contact_email: user.contact_email.clone(),
            is_admin: user.is_admin,
            password_hash: user.password_hash.clone(),
            created_at: at(2025, 1, 1, 0),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, PoolServiceError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &patch.team_name {
            user.team_name = v.clone();
        }
        if let Some(v) = &patch.user_name {
            user.user_name = v.clone();
        }
        if let Some(v) = &patch.contact_email {
            user.contact_email = v.clone();
        }
        if let Some(v) = &patch.password_hash {
            user.password_hash = v.clone();
        }
        if let Some(v) = patch.is_admin {
            user.is_admin = v;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_unless_holding(&self, id: i64) -> Result<DeleteUserOutcome, PoolServiceError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            Ok(DeleteUserOutcome::NotFound)
        } else {
            Ok(DeleteUserOutcome::Deleted)
        }
    }
}
