//! Report repository.

use std::sync::Arc;

use crate::entities::{Department, Report, ReportStatus, report};
use whisper_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Scope of a report listing or count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Restrict to one department.
    pub department: Option<Department>,
    /// Restrict to reports assigned to this investigator.
    pub assigned_to: Option<String>,
    /// Restrict to one status.
    pub status: Option<ReportStatus>,
}

impl ReportFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(department) = self.department {
            cond = cond.add(report::Column::Department.eq(department));
        }
        if let Some(assignee) = &self.assigned_to {
            cond = cond.add(report::Column::AssignedTo.eq(assignee.as_str()));
        }
        if let Some(status) = self.status {
            cond = cond.add(report::Column::Status.eq(status));
        }
        cond
    }
}

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Update a report.
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find a report by internal ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find a report by internal ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
    }

    /// Find a report by its public reference id.
    pub async fn find_by_reference_id(
        &self,
        reference_id: &str,
    ) -> AppResult<Option<report::Model>> {
        Report::find()
            .filter(report::Column::ReferenceId.eq(reference_id))
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Whether a reference id is already taken.
    pub async fn reference_id_exists(&self, reference_id: &str) -> AppResult<bool> {
        let count = Report::find()
            .filter(report::Column::ReferenceId.eq(reference_id))
            .count(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)?;
        Ok(count > 0)
    }

    /// List reports matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &ReportFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(filter.condition())
            .order_by_desc(report::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Count reports matching `filter`, grouped by status.
    ///
    /// Statuses with no reports are absent from the result.
    pub async fn count_by_status(
        &self,
        filter: &ReportFilter,
    ) -> AppResult<Vec<(ReportStatus, i64)>> {
        Report::find()
            .select_only()
            .column(report::Column::Status)
            .column_as(report::Column::Id.count(), "total")
            .filter(filter.condition())
            .group_by(report::Column::Status)
            .into_tuple::<(ReportStatus, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::ReportCategory;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_report(id: &str, reference_id: &str) -> report::Model {
        report::Model {
            id: id.to_string(),
            reference_id: reference_id.to_string(),
            company_id: "c1".to_string(),
            reporter_id: None,
            reporter_name: None,
            title: "Unsafe scaffolding".to_string(),
            person_accused: None,
            category: ReportCategory::SafetyViolation,
            department: Department::Operations,
            description: "Scaffolding on site B lacks guard rails.".to_string(),
            evidence_text: None,
            evidence_key: None,
            evidence_content_type: None,
            evidence_size: None,
            status: ReportStatus::Pending,
            status_password_hash: "$argon2id$placeholder".to_string(),
            is_anonymous: true,
            assigned_to: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_reference_id_found() {
        let report = create_test_report("r1", "REF-123456");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report.clone()]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.find_by_reference_id("REF-123456").await.unwrap();

        assert_eq!(result.unwrap().id, "r1");
    }

    #[tokio::test]
    async fn test_list_for_department() {
        let r1 = create_test_report("r1", "REF-111111");
        let r2 = create_test_report("r2", "REF-222222");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r2.clone(), r1.clone()]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let filter = ReportFilter {
            department: Some(Department::Operations),
            ..Default::default()
        };
        let result = repo.list(&filter, 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "r2");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
