use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use ekpool_domain::audit::CodeAction;
use ekpool_domain::country::Region;
use ekpool_domain::family::Family;

/// Authenticated caller performing a mutation; recorded on audit entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub user_name: String,
}

/// A validated reservation request handed to the ledger.
///
/// `country` is the catalog spelling. For country-scoped families it selects
/// the pool partition; for COMMON it is only recorded.
#[derive(Debug, Clone)]
pub struct Claim {
    pub family: Family,
    pub country: Option<String>,
    pub region: Option<Region>,
    pub tester_name: String,
    pub actor: Actor,
}

/// A code currently in the reserved state together with its reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldCode {
    pub code: String,
    pub family: Family,
    pub country: Option<String>,
    pub tester_name: String,
    pub holder_id: i64,
    pub holder_name: String,
    pub requested_at: DateTime<Utc>,
}

/// Available and reserved codes of one family, each in pool order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pool {
    pub available: Vec<String>,
    pub reserved: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CodeCounts {
    pub total: u64,
    pub reserved: u64,
    pub available: u64,
}

/// What happens to a reserved code when its holder gives it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Return the code to the end of its family's available sequence.
    Release { note: Option<String> },
    /// Retire the code permanently; the clearance reference becomes the audit note.
    Clear { clearance_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    Returned,
    NotReserved,
    NotFound,
}

/// A code about to be inserted into its family's available sequence.
#[derive(Debug, Clone)]
pub struct NewCode {
    pub code: String,
    pub family: Family,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// Audit entry before the store assigns its id.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub code: String,
    pub action: CodeAction,
    pub acting_user: String,
    pub tester_name: Option<String>,
    pub country: Option<String>,
    pub region: Option<Region>,
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl AuditDraft {
    pub fn new(code: &str, action: CodeAction, actor: &Actor, logged_at: DateTime<Utc>) -> Self {
        Self {
            code: code.to_owned(),
            action,
            acting_user: actor.user_name.clone(),
            tester_name: None,
            country: None,
            region: None,
            note: None,
            logged_at,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn for_claim(mut self, claim: &Claim) -> Self {
        self.tester_name = Some(claim.tester_name.clone());
        self.country = claim.country.clone();
        self.region = claim.region;
        self
    }

    pub fn into_entry(self, id: i64) -> AuditEntry {
        AuditEntry {
            id,
            code: self.code,
            action: self.action,
            acting_user: self.acting_user,
            tester_name: self.tester_name,
            country: self.country,
            region: self.region,
            note: self.note,
            logged_at: self.logged_at,
        }
    }
}

/// One immutable row of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: i64,
    pub code: String,
    pub action: CodeAction,
    pub acting_user: String,
    pub tester_name: Option<String>,
    pub country: Option<String>,
    pub region: Option<Region>,
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// Audit query filters; all present filters are ANDed.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Case-insensitive substring of the code.
    pub code: Option<String>,
    /// Case-insensitive substring of the acting user name.
    pub user_name: Option<String>,
    pub action: Option<CodeAction>,
    /// Inclusive UTC calendar date bounds on `logged_at`.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| match needle {
            Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
            None => true,
        };
        let day = entry.logged_at.date_naive();
        contains(&entry.code, &self.code)
            && contains(&entry.acting_user, &self.user_name)
            && self.action.is_none_or(|a| a == entry.action)
            && self.start_date.is_none_or(|d| day >= d)
            && self.end_date.is_none_or(|d| day <= d)
    }
}

/// Oldest and newest `logged_at`; both `None` while the log is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// Team account. The password hash is opaque to this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub team_name: String,
    pub user_name: String,
    pub contact_email: String,
    pub is_admin: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub team_name: String,
    pub user_name: String,
    pub contact_email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Partial user update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub team_name: Option<String>,
    pub user_name: Option<String>,
    pub contact_email: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.team_name.is_none()
            && self.user_name.is_none()
            && self.contact_email.is_none()
            && self.password_hash.is_none()
            && self.is_admin.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteUserOutcome {
    Deleted,
    NotFound,
    /// The user still holds this many reserved codes.
    Holding(u64),
}
