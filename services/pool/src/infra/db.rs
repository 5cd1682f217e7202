use std::collections::BTreeMap;

use anyhow::Context as _;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
    sea_query::{LockBehavior, LockType, OnConflict},
};

use ekpool_core::sea_ext::contains_ignore_case;
use ekpool_domain::audit::CodeAction;
use ekpool_domain::country::Region;
use ekpool_domain::family::{CodeState, Family};
use ekpool_domain::pagination::{Page, PageRequest};
use ekpool_pool_schema::{audit_logs, codes, users};

use crate::domain::repository::{AuditLogRepository, CodeLedger, UserRepository};
use crate::domain::types::{
    Actor, AuditDraft, AuditEntry, AuditFilter, Claim, CodeCounts, DateBounds, DeleteUserOutcome,
    Disposition, HeldCode, InsertOutcome, NewCode, NewUser, Pool, ReturnOutcome, User, UserPatch,
};
use crate::error::PoolServiceError;

/// `logged_at` is left to the column default so it is taken at insert time,
/// in the same statement that draws the id.
async fn append_audit<C: ConnectionTrait>(conn: &C, draft: AuditDraft) -> Result<(), DbErr> {
    audit_logs::ActiveModel {
        id: NotSet,
        code: Set(draft.code),
        action: Set(draft.action.as_str().to_owned()),
        acting_user: Set(draft.acting_user),
        tester_name: Set(draft.tester_name),
        country: Set(draft.country),
        region: Set(draft.region.map(|r| r.as_str().to_owned())),
        note: Set(draft.note),
        logged_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}

// ── Code ledger ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCodeLedger {
    pub db: DatabaseConnection,
}

impl CodeLedger for DbCodeLedger {
    async fn pools(&self) -> Result<BTreeMap<Family, Pool>, PoolServiceError> {
        let rows = codes::Entity::find()
            .order_by_asc(codes::Column::AvailableSince)
            .order_by_asc(codes::Column::Seq)
            .all(&self.db)
            .await
            .context("list codes")?;

        let mut pools: BTreeMap<Family, Pool> =
            Family::ALL.into_iter().map(|f| (f, Pool::default())).collect();
        let mut reserved = Vec::new();
        for row in rows {
            let family = parse_family(&row.family)?;
            if row.state == CodeState::Reserved.as_str() {
                reserved.push((family, row.requested_at, row.code));
            } else {
                pools.entry(family).or_default().available.push(row.code);
            }
        }
        reserved.sort_by_key(|(_, requested_at, _)| *requested_at);
        for (family, _, code) in reserved {
            pools.entry(family).or_default().reserved.push(code);
        }
        Ok(pools)
    }

    async fn counts(&self) -> Result<CodeCounts, PoolServiceError> {
        let rows: Vec<(String, i64)> = codes::Entity::find()
            .select_only()
            .column(codes::Column::State)
            .column_as(codes::Column::Code.count(), "count")
            .group_by(codes::Column::State)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count codes by state")?;

        let mut counts = CodeCounts::default();
        for (state, n) in rows {
            let n = u64::try_from(n).unwrap_or_default();
            if state == CodeState::Reserved.as_str() {
                counts.reserved += n;
            } else {
                counts.available += n;
            }
        }
        counts.total = counts.available + counts.reserved;
        Ok(counts)
    }

    async fn claim_available(&self, claim: &Claim) -> Result<Option<HeldCode>, PoolServiceError> {
        let held = self
            .db
            .transaction::<_, Option<HeldCode>, DbErr>(|txn| {
                let claim = claim.clone();
                Box::pin(async move {
                    let mut query = codes::Entity::find()
                        .filter(codes::Column::Family.eq(claim.family.as_str()))
                        .filter(codes::Column::State.eq(CodeState::Available.as_str()));
                    if claim.family.requires_country() {
                        let Some(country) = &claim.country else {
                            return Ok(None);
                        };
                        query = query.filter(codes::Column::Country.eq(country.as_str()));
                    }
                    // Concurrent claimers skip rows another transaction already holds.
                    let Some(row) = query
                        .order_by_asc(codes::Column::AvailableSince)
                        .order_by_asc(codes::Column::Seq)
                        .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
                        .one(txn)
                        .await?
                    else {
                        return Ok(None);
                    };

                    let now = Utc::now();
                    let code = row.code.clone();
                    let mut am = row.into_active_model();
                    am.state = Set(CodeState::Reserved.as_str().to_owned());
                    am.holder_id = Set(Some(claim.actor.user_id));
                    am.holder_name = Set(Some(claim.actor.user_name.clone()));
                    am.tester_name = Set(Some(claim.tester_name.clone()));
                    am.reserved_country = Set(claim.country.clone());
                    am.requested_at = Set(Some(now));
                    am.update(txn).await?;

                    append_audit(
                        txn,
                        AuditDraft::new(&code, CodeAction::Reserved, &claim.actor, now)
                            .for_claim(&claim),
                    )
                    .await?;

                    Ok(Some(HeldCode {
                        code,
                        family: claim.family,
                        country: claim.country,
                        tester_name: claim.tester_name,
                        holder_id: claim.actor.user_id,
                        holder_name: claim.actor.user_name,
                        requested_at: now,
                    }))
                })
            })
            .await
            .context("claim available code")?;
        Ok(held)
    }

    async fn return_reserved(
        &self,
        code: &str,
        disposition: &Disposition,
        actor: &Actor,
    ) -> Result<ReturnOutcome, PoolServiceError> {
        let outcome = self
            .db
            .transaction::<_, ReturnOutcome, DbErr>(|txn| {
                let code = code.to_owned();
                let disposition = disposition.clone();
                let actor = actor.clone();
                Box::pin(async move {
                    let Some(row) = codes::Entity::find_by_id(code.clone())
                        .lock_exclusive()
                        .one(txn)
                        .await?
                    else {
                        return Ok(ReturnOutcome::NotFound);
                    };
                    if row.state != CodeState::Reserved.as_str() {
                        return Ok(ReturnOutcome::NotReserved);
                    }

                    let now = Utc::now();
                    let note = match disposition {
                        Disposition::Release { note } => {
                            let mut am = row.into_active_model();
                            am.state = Set(CodeState::Available.as_str().to_owned());
                            am.available_since = Set(now);
                            am.holder_id = Set(None);
                            am.holder_name = Set(None);
                            am.tester_name = Set(None);
                            am.reserved_country = Set(None);
                            am.requested_at = Set(None);
                            am.update(txn).await?;
                            note
                        }
                        Disposition::Clear { clearance_id } => {
                            codes::Entity::delete_by_id(code.clone()).exec(txn).await?;
                            Some(clearance_id)
                        }
                    };
                    append_audit(
                        txn,
                        AuditDraft::new(&code, CodeAction::Released, &actor, now).with_note(note),
                    )
                    .await?;
                    Ok(ReturnOutcome::Returned)
                })
            })
            .await
            .context("return reserved code")?;
        Ok(outcome)
    }

    async fn insert_available(
        &self,
        code: &NewCode,
        actor: &Actor,
        note: &str,
    ) -> Result<InsertOutcome, PoolServiceError> {
        let outcome = self
            .db
            .transaction::<_, InsertOutcome, DbErr>(|txn| {
                let code = code.clone();
                let actor = actor.clone();
                let note = note.to_owned();
                Box::pin(async move {
                    let now = Utc::now();
                    let inserted = codes::Entity::insert(codes::ActiveModel {
                        code: Set(code.code.clone()),
                        family: Set(code.family.as_str().to_owned()),
                        country: Set(code.country.clone()),
                        state: Set(CodeState::Available.as_str().to_owned()),
                        seq: NotSet,
                        available_since: Set(now),
                        holder_id: Set(None),
                        holder_name: Set(None),
                        tester_name: Set(None),
                        reserved_country: Set(None),
                        requested_at: Set(None),
                        created_at: Set(now),
                    })
                    .on_conflict(
                        OnConflict::column(codes::Column::Code)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    if inserted == 0 {
                        return Ok(InsertOutcome::Duplicate);
                    }
                    append_audit(
                        txn,
                        AuditDraft::new(&code.code, CodeAction::Added, &actor, now)
                            .with_note(Some(note)),
                    )
                    .await?;
                    Ok(InsertOutcome::Inserted)
                })
            })
            .await
            .context("insert available code")?;
        Ok(outcome)
    }

    async fn remove(&self, code: &str, actor: &Actor) -> Result<bool, PoolServiceError> {
        let removed = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let code = code.to_owned();
                let actor = actor.clone();
                Box::pin(async move {
                    let res = codes::Entity::delete_by_id(code.clone()).exec(txn).await?;
                    if res.rows_affected == 0 {
                        return Ok(false);
                    }
                    append_audit(
                        txn,
                        AuditDraft::new(&code, CodeAction::Deleted, &actor, Utc::now()),
                    )
                    .await?;
                    Ok(true)
                })
            })
            .await
            .context("remove code")?;
        Ok(removed)
    }

    async fn held_by(&self, user_id: i64) -> Result<Vec<HeldCode>, PoolServiceError> {
        let rows = codes::Entity::find()
            .filter(codes::Column::HolderId.eq(user_id))
            .filter(codes::Column::State.eq(CodeState::Reserved.as_str()))
            .order_by_desc(codes::Column::RequestedAt)
            .order_by_asc(codes::Column::Code)
            .all(&self.db)
            .await
            .context("list codes held by user")?;
        rows.into_iter().map(held_from_model).collect()
    }
}

fn parse_family(raw: &str) -> Result<Family, PoolServiceError> {
    Ok(raw
        .parse::<Family>()
        .with_context(|| format!("unknown family {raw:?} in codes table"))?)
}

fn held_from_model(model: codes::Model) -> Result<HeldCode, PoolServiceError> {
    let family = parse_family(&model.family)?;
    let holder_id = model
        .holder_id
        .with_context(|| format!("reserved code {} has no holder", model.code))?;
    let requested_at = model
        .requested_at
        .with_context(|| format!("reserved code {} has no requested_at", model.code))?;
    Ok(HeldCode {
        code: model.code,
        family,
        country: model.reserved_country,
        tester_name: model.tester_name.unwrap_or_default(),
        holder_id,
        holder_name: model.holder_name.unwrap_or_default(),
        requested_at,
    })
}

// ── Audit log ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuditLogRepository {
    pub db: DatabaseConnection,
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn audit_condition(filter: &AuditFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(code) = &filter.code {
        cond = cond.add(contains_ignore_case(audit_logs::Column::Code, code));
    }
    if let Some(user_name) = &filter.user_name {
        cond = cond.add(contains_ignore_case(audit_logs::Column::ActingUser, user_name));
    }
    if let Some(action) = filter.action {
        cond = cond.add(audit_logs::Column::Action.eq(action.as_str()));
    }
    if let Some(start) = filter.start_date {
        cond = cond.add(audit_logs::Column::LoggedAt.gte(start_of_day(start)));
    }
    if let Some(end) = filter.end_date.and_then(|d| d.checked_add_days(Days::new(1))) {
        cond = cond.add(audit_logs::Column::LoggedAt.lt(start_of_day(end)));
    }
    cond
}

impl AuditLogRepository for DbAuditLogRepository {
    async fn query(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PoolServiceError> {
        let select = audit_logs::Entity::find().filter(audit_condition(filter));
        let total_count = select
            .clone()
            .count(&self.db)
            .await
            .context("count audit entries")?;
        let rows = select
            .order_by_desc(audit_logs::Column::LoggedAt)
            .order_by_desc(audit_logs::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("query audit entries")?;
        let items = rows
            .into_iter()
            .map(audit_from_model)
            .collect::<Result<_, _>>()?;
        Ok(Page { items, total_count })
    }

    async fn date_bounds(&self) -> Result<DateBounds, PoolServiceError> {
        let (oldest, newest) = audit_logs::Entity::find()
            .select_only()
            .column_as(audit_logs::Column::LoggedAt.min(), "oldest")
            .column_as(audit_logs::Column::LoggedAt.max(), "newest")
            .into_tuple::<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)>()
            .one(&self.db)
            .await
            .context("audit date bounds")?
            .unwrap_or((None, None));
        Ok(DateBounds { oldest, newest })
    }
}

fn audit_from_model(model: audit_logs::Model) -> Result<AuditEntry, PoolServiceError> {
    let action = model
        .action
        .parse::<CodeAction>()
        .with_context(|| format!("audit entry {} has unknown action", model.id))?;
    Ok(AuditEntry {
        id: model.id,
        code: model.code,
        action,
        acting_user: model.acting_user,
        tester_name: model.tester_name,
        country: model.country,
        region: model.region.as_deref().and_then(Region::from_code),
        note: model.note,
        logged_at: model.logged_at,
    })
}

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

fn user_write_error(err: DbErr, context: &'static str) -> PoolServiceError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return PoolServiceError::UserAlreadyExists;
    }
    PoolServiceError::Internal(anyhow::Error::new(err).context(context))
}

impl UserRepository for DbUserRepository {
    async fn list_members(&self) -> Result<Vec<User>, PoolServiceError> {
        let rows = users::Entity::find()
            .filter(users::Column::IsAdmin.eq(false))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .context("list members")?;
        Ok(rows.into_iter().map(user_from_model).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, PoolServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PoolServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::ContactEmail.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &NewUser) -> Result<User, PoolServiceError> {
        let model = users::ActiveModel {
            id: NotSet,
            team_name: Set(user.team_name.clone()),
            user_name: Set(user.user_name.clone()),
            contact_email: Set(user.contact_email.clone()),
            is_admin: Set(user.is_admin),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| user_write_error(e, "create user"))?;
        Ok(user_from_model(model))
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, PoolServiceError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user for update")?
        else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(user_from_model(model)));
        }
        let mut am = model.into_active_model();
        if let Some(v) = &patch.team_name {
            am.team_name = Set(v.clone());
        }
        if let Some(v) = &patch.user_name {
            am.user_name = Set(v.clone());
        }
        if let Some(v) = &patch.contact_email {
            am.contact_email = Set(v.clone());
        }
        if let Some(v) = &patch.password_hash {
            am.password_hash = Set(v.clone());
        }
        if let Some(v) = patch.is_admin {
            am.is_admin = Set(v);
        }
        let updated = am
            .update(&self.db)
            .await
            .map_err(|e| user_write_error(e, "update user"))?;
        Ok(Some(user_from_model(updated)))
    }

    async fn delete_unless_holding(&self, id: i64) -> Result<DeleteUserOutcome, PoolServiceError> {
        let outcome = self
            .db
            .transaction::<_, DeleteUserOutcome, DbErr>(|txn| {
                Box::pin(async move {
                    let held = codes::Entity::find()
                        .filter(codes::Column::HolderId.eq(id))
                        .filter(codes::Column::State.eq(CodeState::Reserved.as_str()))
                        .count(txn)
                        .await?;
                    if held > 0 {
                        return Ok(DeleteUserOutcome::Holding(held));
                    }
                    let res = users::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(if res.rows_affected == 0 {
                        DeleteUserOutcome::NotFound
                    } else {
                        DeleteUserOutcome::Deleted
                    })
                })
            })
            .await
            .context("delete user")?;
        Ok(outcome)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        team_name: model.team_name,
        user_name: model.user_name,
        contact_email: model.contact_email,
        is_admin: model.is_admin,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}
