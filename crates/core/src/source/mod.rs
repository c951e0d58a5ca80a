//! Ledger acquisition for a project.
//!
//! Ledger files are fetched from one configured backend:
//! - Object storage through Apache OpenDAL (S3-compatible or local filesystem),
//!   one `<project_id>/` prefix per project
//! - A files API over HTTP that indexes a project's files and serves each as CSV
//!
//! Every file is decoded with [`crate::ledger::decode`] and the rows are
//! concatenated in file order.

mod error;
mod service;

use async_trait::async_trait;

use crate::ledger::{LedgerRow, ProjectId};

pub use error::SourceError;
pub use service::LedgerLoader;

/// Something that can produce the ledger snapshot of a project.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Loads every ledger row of the project.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when the project has no rows and
    /// [`SourceError::Unavailable`] when the backend cannot be reached.
    async fn load(&self, project_id: &ProjectId) -> Result<Vec<LedgerRow>, SourceError>;
}
