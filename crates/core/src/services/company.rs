//! Company verification and provisioning.

use whisper_common::{AppError, AppResult, IdGenerator};
use whisper_db::{entities::company, repositories::CompanyRepository};
use sea_orm::Set;

/// Company service.
#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
    expose_roster: bool,
    id_gen: IdGenerator,
}

impl CompanyService {
    /// Create a new company service.
    ///
    /// `expose_roster` opens [`Self::list_organizations`] to every caller.
    #[must_use]
    pub const fn new(company_repo: CompanyRepository, expose_roster: bool) -> Self {
        Self {
            company_repo,
            expose_roster,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a human-entered company code.
    pub async fn verify_code(&self, code: &str) -> AppResult<company::Model> {
        let code = normalize_code(code)?;

        let found = self.company_repo.find_by_code(&code).await?;
        found.ok_or_else(|| AppError::NotFound("invalid company code".to_string()))
    }

    /// List every organization.
    ///
    /// Admins may always list; anyone else only when the roster is exposed.
    pub async fn list_organizations(&self, is_admin: bool) -> AppResult<Vec<company::Model>> {
        if !self.expose_roster && !is_admin {
            return Err(AppError::Forbidden(
                "organization roster is not available".to_string(),
            ));
        }
        self.company_repo.list_all().await
    }

    /// Create an organization with a unique code.
    pub async fn create_organization(&self, name: &str, code: &str) -> AppResult<company::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("company name is required".to_string()));
        }
        let code = normalize_code(code)?;

        if self.company_repo.find_by_code(&code).await?.is_some() {
            return Err(AppError::Conflict(format!("company code {code} already exists")));
        }

        let model = company::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            code: Set(code),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.company_repo.create(model).await?;
        tracing::info!(company_id = %created.id, code = %created.code, "Organization created");
        Ok(created)
    }
}

fn normalize_code(code: &str) -> AppResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::Validation("company code is required".to_string()));
    }
    Ok(code.to_uppercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn acme() -> company::Model {
        company::Model {
            id: "c1".to_string(),
            name: "Acme Corp".to_string(),
            code: "ACME01".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase, expose_roster: bool) -> CompanyService {
        CompanyService::new(
            CompanyRepository::new(Arc::new(db.into_connection())),
            expose_roster,
        )
    }

    #[tokio::test]
    async fn test_verify_code_empty_is_validation_error() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres), false);
        let result = service.verify_code("   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_verify_code_normalizes_case() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[acme()]]);
        let service = service(db, false);

        let org = service.verify_code(" acme01 ").await.unwrap();
        assert_eq!(org.name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_verify_code_unknown() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<company::Model>::new()]);
        let service = service(db, false);

        let err = service.verify_code("NOPE").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "invalid company code"));
    }

    #[tokio::test]
    async fn test_list_organizations_hidden_by_default() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres), false);
        let result = service.list_organizations(false).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_organizations_for_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[acme()]]);
        let service = service(db, false);

        let orgs = service.list_organizations(true).await.unwrap();
        assert_eq!(orgs.len(), 1);
    }

    #[tokio::test]
    async fn test_create_organization_duplicate_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[acme()]]);
        let service = service(db, false);

        let result = service.create_organization("Acme Again", "acme01").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_organization_requires_name() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres), false);
        let result = service.create_organization("", "ACME02").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
