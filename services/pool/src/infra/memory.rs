//! Mutex-guarded in-memory store.
//!
//! Each operation runs inside one critical section with no `.await`, so a
//! pool mutation and its audit append are never observed apart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use ekpool_domain::audit::CodeAction;
use ekpool_domain::family::Family;
use ekpool_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AuditLogRepository, CodeLedger, UserRepository};
use crate::domain::types::{
    Actor, AuditDraft, AuditEntry, AuditFilter, Claim, CodeCounts, DateBounds, DeleteUserOutcome,
    Disposition, HeldCode, InsertOutcome, NewCode, NewUser, Pool, ReturnOutcome, User, UserPatch,
};
use crate::error::PoolServiceError;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct Reservation {
    holder_id: i64,
    holder_name: String,
    tester_name: String,
    country: Option<String>,
    requested_at: DateTime<Utc>,
}

struct CodeRecord {
    family: Family,
    country: Option<String>,
    reservation: Option<Reservation>,
}

#[derive(Default)]
struct MemoryState {
    codes: HashMap<String, CodeRecord>,
    pools: BTreeMap<Family, Pool>,
    audit: Vec<AuditEntry>,
    users: BTreeMap<i64, User>,
    last_user_id: i64,
}

impl MemoryState {
    fn append(&mut self, draft: AuditDraft) {
        let id = self.audit.len() as i64 + 1;
        self.audit.push(draft.into_entry(id));
    }

    fn held(&self, code: &str, record: &CodeRecord) -> Option<HeldCode> {
        let r = record.reservation.as_ref()?;
        Some(HeldCode {
            code: code.to_owned(),
            family: record.family,
            country: r.country.clone(),
            tester_name: r.tester_name.clone(),
            holder_id: r.holder_id,
            holder_name: r.holder_name.clone(),
            requested_at: r.requested_at,
        })
    }

    fn count_held_by(&self, user_id: i64) -> u64 {
        self.codes
            .values()
            .filter(|r| r.reservation.as_ref().is_some_and(|r| r.holder_id == user_id))
            .count() as u64
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.contact_email.eq_ignore_ascii_case(email))
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Store whose timestamps come from `clock` instead of the system time.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryState::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, PoolServiceError> {
        self.inner
            .lock()
            .map_err(|_| PoolServiceError::Internal(anyhow!("memory store lock poisoned")))
    }

    /// Call only while holding the lock so audit ids and `logged_at` agree.
    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

// ── Code ledger ──────────────────────────────────────────────────────────────

impl CodeLedger for MemoryStore {
    async fn pools(&self) -> Result<BTreeMap<Family, Pool>, PoolServiceError> {
        let state = self.lock()?;
        let mut pools = state.pools.clone();
        for family in Family::ALL {
            pools.entry(family).or_default();
        }
        Ok(pools)
    }

    async fn counts(&self) -> Result<CodeCounts, PoolServiceError> {
        let state = self.lock()?;
        let (available, reserved) = state.pools.values().fold((0u64, 0u64), |(a, r), pool| {
            (a + pool.available.len() as u64, r + pool.reserved.len() as u64)
        });
        Ok(CodeCounts {
            total: available + reserved,
            reserved,
            available,
        })
    }

    async fn claim_available(&self, claim: &Claim) -> Result<Option<HeldCode>, PoolServiceError> {
        let mut guard = self.lock()?;
        let now = self.now();
        let state = &mut *guard;

        if claim.family.requires_country() && claim.country.is_none() {
            return Ok(None);
        }
        let pool = state.pools.entry(claim.family).or_default();
        let codes = &state.codes;
        let position = pool.available.iter().position(|code| {
            !claim.family.requires_country()
                || codes.get(code).is_some_and(|r| r.country == claim.country)
        });
        let Some(position) = position else {
            return Ok(None);
        };
        let code = pool.available.remove(position);
        pool.reserved.push(code.clone());

        let record = state
            .codes
            .get_mut(&code)
            .ok_or_else(|| anyhow!("pool sequence references unknown code {code}"))?;
        record.reservation = Some(Reservation {
            holder_id: claim.actor.user_id,
            holder_name: claim.actor.user_name.clone(),
            tester_name: claim.tester_name.clone(),
            country: claim.country.clone(),
            requested_at: now,
        });
        let held = HeldCode {
            code: code.clone(),
            family: record.family,
            country: claim.country.clone(),
            tester_name: claim.tester_name.clone(),
            holder_id: claim.actor.user_id,
            holder_name: claim.actor.user_name.clone(),
            requested_at: now,
        };
        state.append(AuditDraft::new(&code, CodeAction::Reserved, &claim.actor, now).for_claim(claim));
        Ok(Some(held))
    }

    async fn return_reserved(
        &self,
        code: &str,
        disposition: &Disposition,
        actor: &Actor,
    ) -> Result<ReturnOutcome, PoolServiceError> {
        let mut guard = self.lock()?;
        let now = self.now();
        let state = &mut *guard;

        let Some(record) = state.codes.get_mut(code) else {
            return Ok(ReturnOutcome::NotFound);
        };
        if record.reservation.take().is_none() {
            return Ok(ReturnOutcome::NotReserved);
        }
        let family = record.family;
        let pool = state.pools.entry(family).or_default();
        pool.reserved.retain(|c| c != code);

        let note = match disposition {
            Disposition::Release { note } => {
                pool.available.push(code.to_owned());
                note.clone()
            }
            Disposition::Clear { clearance_id } => {
                state.codes.remove(code);
                Some(clearance_id.clone())
            }
        };
        state.append(AuditDraft::new(code, CodeAction::Released, actor, now).with_note(note));
        Ok(ReturnOutcome::Returned)
    }

    async fn insert_available(
        &self,
        code: &NewCode,
        actor: &Actor,
        note: &str,
    ) -> Result<InsertOutcome, PoolServiceError> {
        let mut state = self.lock()?;
        let now = self.now();
        if state.codes.contains_key(&code.code) {
            return Ok(InsertOutcome::Duplicate);
        }
        state.codes.insert(
            code.code.clone(),
            CodeRecord {
                family: code.family,
                country: code.country.clone(),
                reservation: None,
            },
        );
        state
            .pools
            .entry(code.family)
            .or_default()
            .available
            .push(code.code.clone());
        state.append(
            AuditDraft::new(&code.code, CodeAction::Added, actor, now).with_note(Some(note.to_owned())),
        );
        Ok(InsertOutcome::Inserted)
    }

    async fn remove(&self, code: &str, actor: &Actor) -> Result<bool, PoolServiceError> {
        let mut state = self.lock()?;
        let now = self.now();
        let Some(record) = state.codes.remove(code) else {
            return Ok(false);
        };
        let pool = state.pools.entry(record.family).or_default();
        pool.available.retain(|c| c != code);
        pool.reserved.retain(|c| c != code);
        state.append(AuditDraft::new(code, CodeAction::Deleted, actor, now));
        Ok(true)
    }

    async fn held_by(&self, user_id: i64) -> Result<Vec<HeldCode>, PoolServiceError> {
        let state = self.lock()?;
        let mut held: Vec<HeldCode> = state
            .codes
            .iter()
            .filter_map(|(code, record)| state.held(code, record))
            .filter(|h| h.holder_id == user_id)
            .collect();
        held.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(a.code.cmp(&b.code)));
        Ok(held)
    }
}

// ── Audit log ────────────────────────────────────────────────────────────────

impl AuditLogRepository for MemoryStore {
    async fn query(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PoolServiceError> {
        let state = self.lock()?;
        let mut matched: Vec<&AuditEntry> =
            state.audit.iter().filter(|e| filter.matches(e)).collect();
        matched.sort_by(|a, b| b.logged_at.cmp(&a.logged_at).then(b.id.cmp(&a.id)));
        let total_count = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(Page { items, total_count })
    }

    async fn date_bounds(&self) -> Result<DateBounds, PoolServiceError> {
        let state = self.lock()?;
        Ok(DateBounds {
            oldest: state.audit.iter().map(|e| e.logged_at).min(),
            newest: state.audit.iter().map(|e| e.logged_at).max(),
        })
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

impl UserRepository for MemoryStore {
    async fn list_members(&self) -> Result<Vec<User>, PoolServiceError> {
        let state = self.lock()?;
        Ok(state.users.values().filter(|u| !u.is_admin).cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, PoolServiceError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PoolServiceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|u| u.contact_email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, PoolServiceError> {
        let mut state = self.lock()?;
        let now = self.now();
        if state.email_taken(&user.contact_email, None) {
            return Err(PoolServiceError::UserAlreadyExists);
        }
        state.last_user_id += 1;
        let created = User {
            id: state.last_user_id,
            team_name: user.team_name.clone(),
            user_name: user.user_name.clone(),
            contact_email: user.contact_email.clone(),
            is_admin: user.is_admin,
            password_hash: user.password_hash.clone(),
            created_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, PoolServiceError> {
        let mut state = self.lock()?;
        if let Some(email) = &patch.contact_email {
            if state.email_taken(email, Some(id)) {
                return Err(PoolServiceError::UserAlreadyExists);
            }
        }
        let Some(user) = state.users.get_mut(&id) else {
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
        let mut state = self.lock()?;
        if !state.users.contains_key(&id) {
            return Ok(DeleteUserOutcome::NotFound);
        }
        let held = state.count_held_by(id);
        if held > 0 {
            return Ok(DeleteUserOutcome::Holding(held));
        }
        state.users.remove(&id);
        Ok(DeleteUserOutcome::Deleted)
    }
}
