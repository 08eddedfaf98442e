//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, UserRole, profile};
use whisper_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find a profile by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
    }

    /// Find a profile by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find a profile by its 8-digit display user id.
    pub async fn find_by_display_user_id(
        &self,
        display_user_id: &str,
    ) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::DisplayUserId.eq(display_user_id))
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find a profile by session token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Count profiles holding `role`.
    pub async fn count_by_role(&self, role: UserRole) -> AppResult<u64> {
        Profile::find()
            .filter(profile::Column::Role.eq(role))
            .count(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_profile(id: &str, email: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: UserRole::User,
            display_user_id: "12345678".to_string(),
            department: None,
            token: Some("test_token".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_token_found() {
        let profile = create_test_profile("p1", "a@example.com");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_token("test_token").await.unwrap();

        assert_eq!(result.unwrap().email, "a@example.com");
    }

    #[tokio::test]
    async fn test_find_by_email_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_email("Nobody@Example.com").await.unwrap();

        assert!(result.is_none());
    }
}
