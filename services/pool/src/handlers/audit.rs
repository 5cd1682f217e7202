use axum::{
    Json,
    extract::{RawQuery, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ekpool_domain::audit::CodeAction;
use ekpool_domain::country::Region;
use ekpool_domain::pagination::PageRequest;

use crate::domain::types::{AuditEntry, AuditFilter, DateBounds};
use crate::error::PoolServiceError;
use crate::handlers::{Caller, require_admin};
use crate::state::AppState;
use crate::usecase::audit::{GetAuditBoundsUseCase, QueryAuditLogUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AuditEntryResponse {
    pub id: i64,
    pub code: String,
    pub action: CodeAction,
    pub user_name: String,
    pub tester_name: Option<String>,
    pub country: Option<String>,
    pub region: Option<Region>,
    pub note: Option<String>,
    #[serde(serialize_with = "ekpool_core::serde::to_rfc3339_ms")]
    pub logged_at: DateTime<Utc>,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(e: AuditEntry) -> Self {
        Self {
            id: e.id,
            code: e.code,
            action: e.action,
            user_name: e.acting_user,
            tester_name: e.tester_name,
            country: e.country,
            region: e.region,
            note: e.note,
            logged_at: e.logged_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuditPageResponse {
    pub entries: Vec<AuditEntryResponse>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

#[derive(Serialize)]
pub struct DateBoundsResponse {
    #[serde(serialize_with = "ekpool_core::serde::to_rfc3339_ms_opt")]
    pub oldest: Option<DateTime<Utc>>,
    #[serde(serialize_with = "ekpool_core::serde::to_rfc3339_ms_opt")]
    pub newest: Option<DateTime<Utc>>,
}

impl From<DateBounds> for DateBoundsResponse {
    fn from(b: DateBounds) -> Self {
        Self {
            oldest: b.oldest,
            newest: b.newest,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

/// Empty values (`?code=`) are treated as absent, as form submissions send them.
#[derive(Deserialize, Default)]
pub struct AuditLogQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub code: Option<String>,
    pub user_name: Option<String>,
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, PoolServiceError> {
    present(value)
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                PoolServiceError::validation(format!("{field} must be a YYYY-MM-DD date"))
            })
        })
        .transpose()
}

impl AuditLogQuery {
    fn into_parts(self) -> Result<(AuditFilter, PageRequest), PoolServiceError> {
        let defaults = PageRequest::default();
        let page = PageRequest {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
        .clamped();
        let action = present(self.action)
            .map(|a| {
                a.trim()
                    .parse::<CodeAction>()
                    .map_err(|e| PoolServiceError::validation(e.to_string()))
            })
            .transpose()?;
        let filter = AuditFilter {
            code: present(self.code),
            user_name: present(self.user_name),
            action,
            start_date: parse_date("start_date", self.start_date)?,
            end_date: parse_date("end_date", self.end_date)?,
        };
        Ok((filter, page))
    }
}

// ── GET /admin/logs ──────────────────────────────────────────────────────────

pub async fn query_logs(
    caller: Caller,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<AuditPageResponse>, PoolServiceError> {
    require_admin(caller)?;
    let query: AuditLogQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| PoolServiceError::validation(format!("invalid query: {e}")))?
        .unwrap_or_default();
    let (filter, page) = query.into_parts()?;

    let uc = QueryAuditLogUseCase {
        repo: state.audit_log(),
    };
    let result = uc.execute(filter, page).await?;
    let total_pages = result.total_pages(page);
    Ok(Json(AuditPageResponse {
        entries: result.items.into_iter().map(Into::into).collect(),
        page: page.page,
        page_size: page.page_size,
        total_count: result.total_count,
        total_pages,
    }))
}

// ── GET /admin/logs/bounds ───────────────────────────────────────────────────

pub async fn get_log_bounds(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<DateBoundsResponse>, PoolServiceError> {
    require_admin(caller)?;
    let uc = GetAuditBoundsUseCase {
        repo: state.audit_log(),
    };
    Ok(Json(uc.execute().await?.into()))
}
