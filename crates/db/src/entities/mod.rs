//! Database entities.

pub mod company;
pub mod profile;
pub mod report;
pub mod report_comment;

pub use company::Entity as Company;
pub use profile::Entity as Profile;
pub use report::Entity as Report;
pub use report_comment::Entity as ReportComment;

pub use profile::UserRole;
pub use report::{Department, ReportCategory, ReportStatus};
