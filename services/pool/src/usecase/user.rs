use crate::domain::repository::{CodeLedger, UserRepository};
use crate::domain::types::{DeleteUserOutcome, HeldCode, NewUser, User, UserPatch};
use crate::error::PoolServiceError;

fn required(field: &str, value: &str) -> Result<String, PoolServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PoolServiceError::validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value.to_owned())
}

fn normalize_email(email: &str) -> Result<String, PoolServiceError> {
    let email = required("contact_email", email)?.to_lowercase();
    if !email.contains('@') {
        return Err(PoolServiceError::validation(
            "contact_email must be an e-mail address",
        ));
    }
    Ok(email)
}

/// A member account together with the codes it currently holds.
#[derive(Debug, Clone)]
pub struct MemberSummary {
    pub user: User,
    pub held: Vec<HeldCode>,
}

// ── ListMembers ──────────────────────────────────────────────────────────────

pub struct ListMembersUseCase<U: UserRepository, L: CodeLedger> {
    pub users: U,
    pub ledger: L,
}

impl<U: UserRepository, L: CodeLedger> ListMembersUseCase<U, L> {
    pub async fn execute(&self) -> Result<Vec<MemberSummary>, PoolServiceError> {
        let members = self.users.list_members().await?;
        let mut summaries = Vec::with_capacity(members.len());
        for user in members {
            let held = self.ledger.held_by(user.id).await?;
            summaries.push(MemberSummary { user, held });
        }
        Ok(summaries)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, id: i64) -> Result<User, PoolServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(PoolServiceError::UserNotFound)
    }
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CreateUserUseCase<U> {
    pub async fn execute(&self, input: NewUser) -> Result<User, PoolServiceError> {
        let user = NewUser {
            team_name: required("team_name", &input.team_name)?,
            user_name: required("user_name", &input.user_name)?,
            contact_email: normalize_email(&input.contact_email)?,
            password_hash: required("password_hash", &input.password_hash)?,
            is_admin: input.is_admin,
        };
        if self.users.find_by_email(&user.contact_email).await?.is_some() {
            return Err(PoolServiceError::UserAlreadyExists);
        }
        let created = self.users.create(&user).await?;
        tracing::info!(user_id = created.id, user_name = %created.user_name, "user created");
        Ok(created)
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateUserUseCase<U> {
    pub async fn execute(&self, id: i64, patch: UserPatch) -> Result<User, PoolServiceError> {
        let patch = UserPatch {
            team_name: patch
                .team_name
                .map(|v| required("team_name", &v))
                .transpose()?,
            user_name: patch
                .user_name
                .map(|v| required("user_name", &v))
                .transpose()?,
            contact_email: patch
                .contact_email
                .map(|v| normalize_email(&v))
                .transpose()?,
            password_hash: patch
                .password_hash
                .map(|v| required("password_hash", &v))
                .transpose()?,
            is_admin: patch.is_admin,
        };
        if let Some(email) = &patch.contact_email {
            let taken = self.users.find_by_email(email).await?;
            if taken.is_some_and(|other| other.id != id) {
                return Err(PoolServiceError::UserAlreadyExists);
            }
        }
        self.users
            .update(id, &patch)
            .await?
            .ok_or(PoolServiceError::UserNotFound)
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    /// Audit entries written by the user are kept.
    pub async fn execute(&self, id: i64) -> Result<(), PoolServiceError> {
        match self.users.delete_unless_holding(id).await? {
            DeleteUserOutcome::Deleted => {
                tracing::info!(user_id = id, "user deleted");
                Ok(())
            }
            DeleteUserOutcome::NotFound => Err(PoolServiceError::UserNotFound),
            DeleteUserOutcome::Holding(n) => Err(PoolServiceError::UserHasReservations(n)),
        }
    }
}
