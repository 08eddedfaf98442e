//! Common utilities and shared types for secure-whisper.
//!
//! This crate provides foundational components used across all secure-whisper crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: internal ids, reference ids and display user ids via [`IdGenerator`]
//! - **Storage**: Evidence file storage backends
//!
//! # Example
//!
//! ```no_run
//! use whisper_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let reference = id_gen.generate_reference_id();
//!     println!("Reference: {}", reference);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, StoredFile, generate_evidence_key};
