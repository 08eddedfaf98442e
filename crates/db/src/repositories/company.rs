//! Company repository.

use std::sync::Arc;

use crate::entities::{Company, company};
use whisper_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Company repository for database operations.
#[derive(Clone)]
pub struct CompanyRepository {
    db: Arc<DatabaseConnection>,
}

impl CompanyRepository {
    /// Create a new company repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a company by its code.
    ///
    /// Codes are stored uppercase; the caller normalizes before lookup.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<company::Model>> {
        Company::find()
            .filter(company::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find a company by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<company::Model>> {
        Company::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find a company by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<company::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))
    }

    /// List every company ordered by name.
    pub async fn list_all(&self) -> AppResult<Vec<company::Model>> {
        Company::find()
            .order_by_asc(company::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Create a new company.
    pub async fn create(&self, model: company::ActiveModel) -> AppResult<company::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Count companies.
    pub async fn count(&self) -> AppResult<u64> {
        Company::find()
            .count(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }
}
