pub mod admin_codes;
pub mod audit;
pub mod codes;
pub mod countries;
pub mod users;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

use ekpool_auth_types::identity::Identity;
use ekpool_domain::country::{CountryCatalog, Region};
use ekpool_domain::family::Family;

use crate::domain::types::{Actor, HeldCode};
use crate::error::PoolServiceError;

/// Bearer identity, or the extractor's rejection so it can be reported as a
/// JSON error body.
pub type Caller = Result<Identity, StatusCode>;

fn authenticated(caller: Caller) -> Result<Identity, PoolServiceError> {
    caller.map_err(|_| PoolServiceError::Unauthorized)
}

fn actor_of(identity: Identity) -> Actor {
    Actor {
        user_id: identity.user_id,
        user_name: identity.user_name,
    }
}

pub(crate) fn require_any(caller: Caller) -> Result<Actor, PoolServiceError> {
    authenticated(caller).map(actor_of)
}

pub(crate) fn require_member(caller: Caller) -> Result<Actor, PoolServiceError> {
    let identity = authenticated(caller)?;
    if identity.role.is_admin() {
        return Err(PoolServiceError::Forbidden);
    }
    Ok(actor_of(identity))
}

pub(crate) fn require_admin(caller: Caller) -> Result<Actor, PoolServiceError> {
    let identity = authenticated(caller)?;
    if !identity.role.is_admin() {
        return Err(PoolServiceError::Forbidden);
    }
    Ok(actor_of(identity))
}

/// A reserved code as shown to members and admins.
#[derive(Serialize)]
pub struct HeldCodeResponse {
    pub code: String,
    pub family: Family,
    pub country: Option<String>,
    pub region: Option<Region>,
    pub tester_name: String,
    pub holder_name: String,
    #[serde(serialize_with = "ekpool_core::serde::to_rfc3339_ms")]
    pub requested_at: DateTime<Utc>,
}

impl HeldCodeResponse {
    pub fn new(held: HeldCode, catalog: &CountryCatalog) -> Self {
        let region = held.country.as_deref().and_then(|c| catalog.region_of(c));
        Self {
            code: held.code,
            family: held.family,
            country: held.country,
            region,
            tester_name: held.tester_name,
            holder_name: held.holder_name,
            requested_at: held.requested_at,
        }
    }
}
