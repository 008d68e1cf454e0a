use crate::achievement::{AchievementKind, AchievementRecord};
use crate::patch::{RecordBoundary, RemovedRecord};
use crate::reconcile::{OutcomeStatus, Reconciliation};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTotals {
    pub achievements: usize,
    pub migrated: usize,
    pub deprecated: usize,
    pub conflicted: usize,
    pub write_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigratedEntry {
    pub uid: String,
    pub kind: AchievementKind,
    pub document: PathBuf,
    /// The document was rewritten on disk.
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEntry {
    pub uid: String,
    pub kind: AchievementKind,
    pub documents: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub uid: String,
    pub document: PathBuf,
    pub error: String,
}

/// Everything a run decided and did, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub achievements_path: PathBuf,
    pub dry_run: bool,
    pub record_boundary: RecordBoundary,
    pub totals: OutcomeTotals,
    pub migrated: Vec<MigratedEntry>,
    pub deprecated: Vec<AchievementRecord>,
    pub conflicted: Vec<ConflictEntry>,
    pub write_failures: Vec<WriteFailure>,
    pub removed_records: Vec<RemovedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_root_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_path: Option<PathBuf>,
}

impl MigrationReport {
    pub fn new(
        achievements_path: impl Into<PathBuf>,
        dry_run: bool,
        record_boundary: RecordBoundary,
        reconciliation: &Reconciliation<'_>,
    ) -> Self {
        let migrated = reconciliation
            .migrated()
            .map(|(achievement, document)| MigratedEntry {
                uid: achievement.uid.clone(),
                kind: achievement.kind.clone(),
                document: document.path(),
                applied: false,
            })
            .collect();
        let deprecated = reconciliation.deprecated().cloned().collect();
        let conflicted = reconciliation
            .conflicted()
            .map(|(achievement, documents)| ConflictEntry {
                uid: achievement.uid.clone(),
                kind: achievement.kind.clone(),
                documents: documents.iter().map(|doc| doc.path()).collect(),
            })
            .collect();

        Self {
            achievements_path: achievements_path.into(),
            dry_run,
            record_boundary,
            totals: OutcomeTotals {
                achievements: reconciliation.len(),
                migrated: reconciliation.count(OutcomeStatus::Migrated),
                deprecated: reconciliation.count(OutcomeStatus::Deprecated),
                conflicted: reconciliation.count(OutcomeStatus::Conflicted),
                write_failures: 0,
            },
            migrated,
            deprecated,
            conflicted,
            write_failures: Vec::new(),
            removed_records: Vec::new(),
            proposed_root_path: None,
            deprecated_path: None,
        }
    }

    /// Conflicts or failed writes need a maintainer before the root can be replaced.
    pub fn has_issues(&self) -> bool {
        !self.conflicted.is_empty() || !self.write_failures.is_empty()
    }
}

#[derive(Serialize)]
struct AchievementsDocument<'a> {
    achievements: &'a [AchievementRecord],
}

/// Render unclaimed achievements in the root collection's schema.
pub fn render_deprecated_document(deprecated: &[AchievementRecord]) -> Result<String> {
    let body = serde_yaml::to_string(&AchievementsDocument {
        achievements: deprecated,
    })?;
    Ok(format!("# Achievements no module or learning path claims.\n{body}"))
}
