//! # Achievement Migrate Core
//!
//! Moves badge and trophy references out of a central achievements collection
//! and into the module and learning path documents that claim them.
//!
//! ## Pipeline
//!
//! ```text
//! achievements.yml ──> AchievementCatalog (typed records + literal lines)
//! modules/*/index.yml ─┐
//! paths/*/index.yml ───┴> DocumentStore (minimal view + literal lines)
//!     │
//!     ├──> reconcile()      Migrated | Deprecated | Conflicted
//!     │
//!     ├──> patch_child()    per migrated achievement, atomic rewrite
//!     │
//!     └──> patch_root()     proposed root, written beside the input
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use achievement_migrate_core::{MigrateConfig, Migrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MigrateConfig::new("learn-pr/achievements.yml")
//!         .with_module_roots(["learn-pr/azure"])
//!         .with_learning_path_root("learn-pr/paths");
//!     let report = Migrator::new(config).run().await?;
//!
//!     println!("{} migrated, {} deprecated", report.totals.migrated, report.totals.deprecated);
//!     Ok(())
//! }
//! ```

mod achievement;
mod config;
mod document;
mod error;
mod fsio;
mod limits;
mod lines;
mod migrate;
mod patch;
mod reconcile;
mod report;
mod store;

pub use achievement::{AchievementCatalog, AchievementKind, AchievementRecord};
pub use config::MigrateConfig;
pub use document::{ChildDocument, DocumentKind, DocumentLocation, DEFAULT_DOCUMENT_FILE_NAME};
pub use error::{ConfigProblem, MigrateError, Result};
pub use fsio::{sibling_artifact, write_artifact, write_atomic};
pub use limits::{default_load_concurrency, load_concurrency_from_env, LOAD_CONCURRENCY_ENV};
pub use lines::LineDocument;
pub use migrate::Migrator;
pub use patch::{
    patch_child, patch_root, record_uid, ChildPatch, RecordBoundary, RemovedRecord, RootPatch,
    RECORD_LINE_COUNT, RECORD_START_MARKER, REFERENCE_MARKER,
};
pub use reconcile::{candidate_pool, classify, reconcile, MatchOutcome, OutcomeStatus, Reconciliation};
pub use report::{
    render_deprecated_document, ConflictEntry, MigratedEntry, MigrationReport, OutcomeTotals,
    WriteFailure,
};
pub use store::{DocumentScanner, DocumentStore};
