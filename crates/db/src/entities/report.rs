//! Report entity.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report lifecycle status. Transitions are owned by staff.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "investigating")]
    Investigating,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl ReportStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::UnderReview,
        Self::Investigating,
        Self::Resolved,
        Self::Closed,
    ];

    /// Stored string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

/// Misconduct category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    #[sea_orm(string_value = "harassment")]
    Harassment,
    #[sea_orm(string_value = "discrimination")]
    Discrimination,
    #[sea_orm(string_value = "fraud")]
    Fraud,
    #[sea_orm(string_value = "safety_violation")]
    SafetyViolation,
    #[sea_orm(string_value = "corruption")]
    Corruption,
    #[sea_orm(string_value = "other")]
    #[default]
    Other,
}

/// Department a report is addressed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Department {
    #[sea_orm(string_value = "HR")]
    #[serde(rename = "HR")]
    Hr,
    #[sea_orm(string_value = "Finance")]
    Finance,
    #[sea_orm(string_value = "IT")]
    #[serde(rename = "IT")]
    It,
    #[sea_orm(string_value = "Marketing")]
    Marketing,
    #[sea_orm(string_value = "Sales")]
    Sales,
    #[sea_orm(string_value = "Operations")]
    Operations,
    #[sea_orm(string_value = "Legal")]
    Legal,
    #[sea_orm(string_value = "Management")]
    Management,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Department {
    /// Every department, in display order.
    pub const ALL: [Self; 9] = [
        Self::Hr,
        Self::Finance,
        Self::It,
        Self::Marketing,
        Self::Sales,
        Self::Operations,
        Self::Legal,
        Self::Management,
        Self::Other,
    ];

    /// Short stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::Finance => "Finance",
            Self::It => "IT",
            Self::Marketing => "Marketing",
            Self::Sales => "Sales",
            Self::Operations => "Operations",
            Self::Legal => "Legal",
            Self::Management => "Management",
            Self::Other => "Other",
        }
    }

    /// Long label shown in forms.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Hr => "Human Resources",
            Self::It => "IT Department",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a department name is not in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown department: {0}")]
pub struct UnknownDepartment(pub String);

impl FromStr for Department {
    type Err = UnknownDepartment;

    /// Accepts the short name or the long label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted) || d.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDepartment(wanted.to_string()))
    }
}

/// Report model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Public lookup key, `REF-######`.
    #[sea_orm(unique)]
    pub reference_id: String,
    pub company_id: String,
    /// Signed-in submitter; never set for anonymous reports.
    pub reporter_id: Option<String>,
    pub reporter_name: Option<String>,
    /// Subject line.
    pub title: String,
    pub person_accused: Option<String>,
    pub category: ReportCategory,
    pub department: Department,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub evidence_text: Option<String>,
    pub evidence_key: Option<String>,
    pub evidence_content_type: Option<String>,
    pub evidence_size: Option<i64>,
    pub status: ReportStatus,
    /// Argon2 hash of the status-check password.
    #[serde(skip_serializing)]
    pub status_password_hash: String,
    pub is_anonymous: bool,
    /// Investigator profile the report is assigned to.
    pub assigned_to: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::report_comment::Entity")]
    ReportComment,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::report_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_accepts_short_and_long_names() {
        assert_eq!("HR".parse::<Department>(), Ok(Department::Hr));
        assert_eq!("Human Resources".parse::<Department>(), Ok(Department::Hr));
        assert_eq!("it department".parse::<Department>(), Ok(Department::It));
        assert_eq!(" Operations ".parse::<Department>(), Ok(Department::Operations));
        assert!("Cafeteria".parse::<Department>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ReportStatus::UnderReview).unwrap_or_default();
        assert_eq!(json, "\"under_review\"");
        for status in ReportStatus::ALL {
            assert_eq!(
                serde_json::to_string(&status).unwrap_or_default(),
                format!("\"{}\"", status.as_str())
            );
        }
    }

    #[test]
    fn test_category_serializes_exact_values() {
        let json = serde_json::to_string(&ReportCategory::SafetyViolation).unwrap_or_default();
        assert_eq!(json, "\"safety_violation\"");
    }
}
