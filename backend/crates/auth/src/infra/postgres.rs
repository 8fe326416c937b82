//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    pending_registration::PendingRegistration,
    profile::UserProfile,
    user_identity::{UserIdentity, UserPage},
};
use crate::domain::repository::{IdentityRepository, PendingRegistrationRepository};
use crate::domain::value_object::{
    email::Email, page::PageRequest, person_name::PersonName, phone::Phone, user_id::UserId,
    user_password::UserPassword, user_role::UserRole, verify_token::VerifyToken,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    email,
    first_name,
    last_name,
    phone,
    password_hash,
    user_role,
    is_verified,
    token,
    refresh_token,
    created_at,
    updated_at
"#;

const PENDING_COLUMNS: &str = r#"
    verify_token,
    email,
    first_name,
    last_name,
    phone,
    password_hash,
    user_role,
    expires_at,
    created_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map unique violations on email/phone to conflicts; anything else stays a
/// database error
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(c) if c.ends_with("_email_key") => return AuthError::EmailTaken,
                Some(c) if c.ends_with("_phone_key") => return AuthError::PhoneTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}

async fn insert_identity<'e, E>(executor: E, identity: &UserIdentity) -> AuthResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(&format!(
        "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
    ))
    .bind(identity.user_id.as_uuid())
    .bind(identity.profile.email.as_str())
    .bind(identity.profile.first_name.as_str())
    .bind(identity.profile.last_name.as_str())
    .bind(identity.profile.phone.as_str())
    .bind(identity.password_hash.as_str())
    .bind(identity.profile.user_role.id())
    .bind(identity.is_verified)
    .bind(identity.token.as_deref())
    .bind(identity.refresh_token.as_deref())
    .bind(identity.created_at)
    .bind(identity.updated_at)
    .execute(executor)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for PgAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_identity).transpose()
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_identity).transpose()
    }

    async fn count_by_email(&self, email: &Email) -> AuthResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_phone(&self, phone: &Phone) -> AuthResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE phone = $1")
            .bind(phone.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn insert(&self, identity: &UserIdentity) -> AuthResult<()> {
        insert_identity(&self.pool, identity).await
    }

    async fn upsert_tokens(&self, identity: &UserIdentity) -> AuthResult<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE SET
                token = EXCLUDED.token,
                refresh_token = EXCLUDED.refresh_token,
                updated_at = EXCLUDED.updated_at
            "#
        ))
        .bind(identity.user_id.as_uuid())
        .bind(identity.profile.email.as_str())
        .bind(identity.profile.first_name.as_str())
        .bind(identity.profile.last_name.as_str())
        .bind(identity.profile.phone.as_str())
        .bind(identity.password_hash.as_str())
        .bind(identity.profile.user_role.id())
        .bind(identity.is_verified)
        .bind(identity.token.as_deref())
        .bind(identity.refresh_token.as_deref())
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn list_page(&self, page: PageRequest) -> AuthResult<UserPage> {
        let total_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, user_id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.per_page()))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(UserRow::into_identity)
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(UserPage { total_count, items })
    }
}

// ============================================================================
// Pending Registration Repository Implementation
// ============================================================================

impl PendingRegistrationRepository for PgAuthRepository {
    async fn count_live_by_email(&self, email: &Email, now: DateTime<Utc>) -> AuthResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pending_registrations WHERE email = $1 AND expires_at >= $2",
        )
        .bind(email.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_live_by_phone(&self, phone: &Phone, now: DateTime<Utc>) -> AuthResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pending_registrations WHERE phone = $1 AND expires_at >= $2",
        )
        .bind(phone.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn create(&self, pending: &PendingRegistration) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        let replaced = sqlx::query(
            r#"
            DELETE FROM pending_registrations
            WHERE (email = $1 OR phone = $2) AND expires_at < $3
            "#,
        )
        .bind(pending.profile.email.as_str())
        .bind(pending.profile.phone.as_str())
        .bind(pending.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(&format!(
            "INSERT INTO pending_registrations ({PENDING_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(pending.verify_token.as_str())
        .bind(pending.profile.email.as_str())
        .bind(pending.profile.first_name.as_str())
        .bind(pending.profile.last_name.as_str())
        .bind(pending.profile.phone.as_str())
        .bind(pending.password_hash.as_str())
        .bind(pending.profile.user_role.id())
        .bind(pending.expires_at)
        .bind(pending.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        tx.commit().await?;

        if replaced > 0 {
            tracing::debug!(replaced = replaced, "Replaced expired pending registrations");
        }
        Ok(())
    }

    async fn find_by_token(&self, token: &VerifyToken) -> AuthResult<Option<PendingRegistration>> {
        let row = sqlx::query_as::<_, PendingRow>(&format!(
            "SELECT {PENDING_COLUMNS} FROM pending_registrations WHERE verify_token = $1"
        ))
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PendingRow::into_pending).transpose()
    }

    async fn promote(&self, token: &VerifyToken, identity: &UserIdentity) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        // Row lock taken here; a concurrent redeemer deletes zero rows
        let deleted = sqlx::query("DELETE FROM pending_registrations WHERE verify_token = $1")
            .bind(token.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping `tx` rolls back
            return Err(AuthError::VerificationNotFound);
        }

        insert_identity(&mut *tx, identity).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM pending_registrations WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(
            pending_deleted = deleted,
            "Cleaned up expired pending registrations"
        );

        Ok(deleted)
    }
}

// ============================================================================
// Row types
// ============================================================================

fn role_from_db(id: i16) -> AuthResult<UserRole> {
    UserRole::from_id(id).ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {id}")))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    phone: String,
    password_hash: String,
    user_role: i16,
    is_verified: bool,
    token: Option<String>,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_identity(self) -> AuthResult<UserIdentity> {
        Ok(UserIdentity {
            user_id: UserId::from_uuid(self.user_id),
            profile: UserProfile {
                email: Email::from_db(self.email),
                first_name: PersonName::from_db(self.first_name),
                last_name: PersonName::from_db(self.last_name),
                phone: Phone::from_db(self.phone),
                user_role: role_from_db(self.user_role)?,
            },
            password_hash: UserPassword::from_db(self.password_hash),
            is_verified: self.is_verified,
            token: self.token,
            refresh_token: self.refresh_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PendingRow {
    verify_token: String,
    email: String,
    first_name: String,
    last_name: String,
    phone: String,
    password_hash: String,
    user_role: i16,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl PendingRow {
    fn into_pending(self) -> AuthResult<PendingRegistration> {
        Ok(PendingRegistration {
            verify_token: VerifyToken::from_db(self.verify_token),
            profile: UserProfile {
                email: Email::from_db(self.email),
                first_name: PersonName::from_db(self.first_name),
                last_name: PersonName::from_db(self.last_name),
                phone: Phone::from_db(self.phone),
                user_role: role_from_db(self.user_role)?,
            },
            password_hash: UserPassword::from_db(self.password_hash),
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}
