//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `whisper_test`)
//!   `TEST_DB_PASSWORD` (default: `whisper_test`)
//!   `TEST_DB_NAME` (default: `whisper_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use sea_orm::Set;
use whisper_common::AppError;
use whisper_db::entities::{Department, ReportCategory, ReportStatus, report};
use whisper_db::repositories::{CompanyRepository, ReportFilter, ReportRepository};
use whisper_db::test_utils::{TestDatabase, TestDbConfig};

fn new_report(id: &str, reference_id: &str, status: ReportStatus) -> report::ActiveModel {
    let now = chrono::Utc::now();
    report::ActiveModel {
        id: Set(id.to_string()),
        reference_id: Set(reference_id.to_string()),
        company_id: Set("c1".to_string()),
        reporter_id: Set(None),
        reporter_name: Set(None),
        title: Set("Subject".to_string()),
        person_accused: Set(None),
        category: Set(ReportCategory::Other),
        department: Set(Department::Hr),
        description: Set("Description".to_string()),
        evidence_text: Set(None),
        evidence_key: Set(None),
        evidence_content_type: Set(None),
        evidence_size: Set(None),
        status: Set(status),
        status_password_hash: Set("hash".to_string()),
        is_anonymous: Set(true),
        assigned_to: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_company_lookup_by_code() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    db.seed_company("c1", "Tech Corp", "tech001").await.unwrap();

    let repo = CompanyRepository::new(db.connection());
    let found = repo.find_by_code("TECH001").await.unwrap();
    assert_eq!(found.map(|c| c.id), Some("c1".to_string()));

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_report_counts_by_status() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    db.seed_company("c1", "Tech Corp", "TECH001").await.unwrap();

    let repo = ReportRepository::new(db.connection());
    for (i, status) in [ReportStatus::Pending, ReportStatus::Pending, ReportStatus::Closed]
        .into_iter()
        .enumerate()
    {
        repo.create(new_report(&format!("r{i}"), &format!("REF-10000{i}"), status))
            .await
            .unwrap();
    }

    let mut counts = repo.count_by_status(&ReportFilter::default()).await.unwrap();
    counts.sort_by_key(|(status, _)| status.as_str());
    assert_eq!(
        counts,
        vec![(ReportStatus::Closed, 1), (ReportStatus::Pending, 2)]
    );

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_reference_id_is_conflict() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    db.seed_company("c1", "Tech Corp", "TECH001").await.unwrap();

    let repo = ReportRepository::new(db.connection());
    repo.create(new_report("r1", "REF-200000", ReportStatus::Pending))
        .await
        .unwrap();

    let result = repo
        .create(new_report("r2", "REF-200000", ReportStatus::Pending))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    db.cleanup().await.unwrap();
}
