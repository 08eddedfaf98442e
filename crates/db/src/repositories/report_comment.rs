//! Report comment repository.

use std::sync::Arc;

use crate::entities::{ReportComment, report_comment};
use whisper_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Report comment repository for database operations.
#[derive(Clone)]
pub struct ReportCommentRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportCommentRepository {
    /// Create a new report comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a comment.
    pub async fn create(
        &self,
        model: report_comment::ActiveModel,
    ) -> AppResult<report_comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// List a report's thread in creation order.
    ///
    /// Internal comments are only included when `include_internal` is set.
    pub async fn list_for_report(
        &self,
        report_id: &str,
        include_internal: bool,
    ) -> AppResult<Vec<report_comment::Model>> {
        let mut query =
            ReportComment::find().filter(report_comment::Column::ReportId.eq(report_id));

        if !include_internal {
            query = query.filter(report_comment::Column::IsInternal.eq(false));
        }

        query
            .order_by_asc(report_comment::Column::CreatedAt)
            .order_by_asc(report_comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }
}
