use ekpool_domain::pagination::{Page, PageRequest};

use crate::domain::repository::AuditLogRepository;
use crate::domain::types::{AuditEntry, AuditFilter, DateBounds};
use crate::error::PoolServiceError;

// ── QueryAuditLog ────────────────────────────────────────────────────────────

pub struct QueryAuditLogUseCase<R: AuditLogRepository> {
    pub repo: R,
}

impl<R: AuditLogRepository> QueryAuditLogUseCase<R> {
    pub async fn execute(
        &self,
        filter: AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PoolServiceError> {
        let filter = AuditFilter {
            code: non_blank(filter.code),
            user_name: non_blank(filter.user_name),
            ..filter
        };
        self.repo.query(&filter, page.clamped()).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── GetAuditBounds ───────────────────────────────────────────────────────────

pub struct GetAuditBoundsUseCase<R: AuditLogRepository> {
    pub repo: R,
}

impl<R: AuditLogRepository> GetAuditBoundsUseCase<R> {
    pub async fn execute(&self) -> Result<DateBounds, PoolServiceError> {
        self.repo.date_bounds().await
    }
}
