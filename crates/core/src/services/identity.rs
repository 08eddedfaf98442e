//! Identity and session provider.

use whisper_common::{AppError, AppResult, IdGenerator, id::is_display_user_id};
use whisper_db::{
    entities::{Department, UserRole, profile},
    repositories::ProfileRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::password::{hash_password, validate_password_pair, verify_dummy, verify_password};

/// Attempts at drawing an unused display user id.
const DISPLAY_ID_ATTEMPTS: usize = 5;

/// The signed-in account a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    profile: profile::Model,
}

impl Session {
    /// Wrap a resolved profile.
    #[must_use]
    pub const fn new(profile: profile::Model) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.profile.id
    }

    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.profile.role
    }

    #[must_use]
    pub fn display_user_id(&self) -> &str {
        &self.profile.display_user_id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.profile.email
    }

    #[must_use]
    pub const fn department(&self) -> Option<Department> {
        self.profile.department
    }

    #[must_use]
    pub const fn profile(&self) -> &profile::Model {
        &self.profile
    }
}

/// Input for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpInput {
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// A new account together with its first session token.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: Session,
    pub token: String,
}

/// Identity service: sign-up, sign-in, sign-out and token resolution.
#[derive(Clone)]
pub struct IdentityService {
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl IdentityService {
    /// Create a new identity service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self {
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account with role `user`.
    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<SignedIn> {
        input.validate()?;
        validate_password_pair(&input.password, &input.password_confirm)?;

        let email = input.email.trim().to_lowercase();
        if self.profile_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let display_user_id = self.unused_display_user_id().await?;
        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            role: Set(UserRole::User),
            display_user_id: Set(display_user_id),
            department: Set(None),
            token: Set(Some(token.clone())),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let profile = match self.profile_repo.create(model).await {
            Ok(profile) => profile,
            // Lost a race with a concurrent sign-up for the same address.
            Err(AppError::Conflict(_)) if self.profile_repo.find_by_email(&email).await?.is_some() => {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            Err(e) => return Err(e),
        };
        tracing::info!(user_id = %profile.id, "Account created");

        Ok(SignedIn {
            session: Session::new(profile),
            token,
        })
    }

    /// Sign in with an email or display user id and a password.
    ///
    /// Unknown logins and wrong passwords fail identically.
    pub async fn sign_in(&self, login: &str, password: &str) -> AppResult<SignedIn> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "login and password are required".to_string(),
            ));
        }

        let found = if is_display_user_id(login) {
            self.profile_repo.find_by_display_user_id(login).await?
        } else {
            self.profile_repo.find_by_email(login).await?
        };

        let Some(profile) = found else {
            verify_dummy(password);
            return Err(AppError::Unauthorized);
        };
        if !verify_password(password, &profile.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let mut active: profile::ActiveModel = profile.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let profile = self.profile_repo.update(active).await?;

        Ok(SignedIn {
            session: Session::new(profile),
            token,
        })
    }

    /// Invalidate the session's token.
    pub async fn sign_out(&self, session: &Session) -> AppResult<()> {
        let mut active: profile::ActiveModel = session.profile().clone().into();
        active.token = Set(None);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.profile_repo.update(active).await?;
        Ok(())
    }

    /// Resolve a bearer token to the current session.
    pub async fn current_session(&self, token: &str) -> AppResult<Option<Session>> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self
            .profile_repo
            .find_by_token(token)
            .await?
            .map(Session::new))
    }

    async fn unused_display_user_id(&self) -> AppResult<String> {
        for _ in 0..DISPLAY_ID_ATTEMPTS {
            let candidate = self.id_gen.generate_display_user_id();
            if self
                .profile_repo
                .find_by_display_user_id(&candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
        }
        Err(AppError::Internal(
            "Could not allocate a display user id".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_profile(password: &str) -> profile::Model {
        profile::Model {
            id: "p1".to_string(),
            email: "staff@example.com".to_string(),
            password_hash: hash_password(password).unwrap(),
            role: UserRole::Moderator,
            display_user_id: "12345678".to_string(),
            department: Some(Department::Hr),
            token: Some("old_token".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> IdentityService {
        IdentityService::new(ProfileRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_sign_up_rejects_mismatch_before_store() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .sign_up(SignUpInput {
                email: "new@example.com".to_string(),
                password: "secret1".to_string(),
                password_confirm: "secret2".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_invalid_email() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .sign_up(SignUpInput {
                email: "not-an-email".to_string(),
                password: "secret1".to_string(),
                password_confirm: "secret1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email() {
        let existing = create_test_profile("secret1");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = service
            .sign_up(SignUpInput {
                email: "Staff@Example.com".to_string(),
                password: "secret1".to_string(),
                password_confirm: "secret1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_login() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()]),
        );

        let result = service.sign_in("87654321", "secret1").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let existing = create_test_profile("secret1");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = service.sign_in("staff@example.com", "wrong-pass").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_sign_in_by_display_id_rotates_token() {
        let existing = create_test_profile("secret1");
        let mut updated = existing.clone();
        updated.token = Some("new_token".to_string());

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[updated]]),
        );

        let signed_in = service.sign_in("12345678", "secret1").await.unwrap();
        assert_eq!(signed_in.session.role(), UserRole::Moderator);
        assert_eq!(signed_in.token.len(), 32);
        assert_ne!(signed_in.token, "old_token");
    }

    #[tokio::test]
    async fn test_sign_out_clears_token() {
        let existing = create_test_profile("secret1");
        let mut cleared = existing.clone();
        cleared.token = None;

        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[cleared]])
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );
        let service = IdentityService::new(ProfileRepository::new(Arc::clone(&conn)));

        service.sign_out(&Session::new(existing)).await.unwrap();
        assert!(service.current_session("old_token").await.unwrap().is_none());

        drop(service);
        let log = format!("{:?}", Arc::try_unwrap(conn).ok().unwrap().into_transaction_log());
        assert!(log.contains("UPDATE"));
        assert!(log.contains("token"));
    }

    #[tokio::test]
    async fn test_current_session_empty_token() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        assert!(service.current_session("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_session_resolves_profile() {
        let existing = create_test_profile("secret1");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let session = service.current_session("old_token").await.unwrap().unwrap();
        assert_eq!(session.user_id(), "p1");
        assert_eq!(session.department(), Some(Department::Hr));
    }
}
