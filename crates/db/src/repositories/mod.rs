//! Repositories over the record store.

pub mod company;
pub mod profile;
pub mod report;
pub mod report_comment;

pub use company::CompanyRepository;
pub use profile::ProfileRepository;
pub use report::{ReportFilter, ReportRepository};
pub use report_comment::ReportCommentRepository;
