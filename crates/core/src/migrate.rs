use crate::achievement::{AchievementCatalog, AchievementRecord};
use crate::config::MigrateConfig;
use crate::document::ChildDocument;
use crate::fsio::{write_artifact, write_atomic};
use crate::patch::{patch_child, patch_root};
use crate::reconcile::reconcile;
use crate::report::{render_deprecated_document, MigrationReport, WriteFailure};
use crate::store::DocumentStore;
use crate::Result;
use std::collections::HashSet;

/// Runs one migration: load, reconcile, patch children, write artifacts.
pub struct Migrator {
    config: MigrateConfig,
}

impl Migrator {
    pub fn new(config: MigrateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<MigrationReport> {
        self.config.validate()?;

        let catalog = AchievementCatalog::load(&self.config.achievements_path)?;
        log::info!(
            "Catalog holds {} badges, {} trophies, {} of other kinds",
            catalog.badges().count(),
            catalog.trophies().count(),
            catalog.other_kinds().count()
        );
        let store = DocumentStore::load(&self.config).await?;
        self.apply(&catalog, &store)
    }

    /// Reconcile loaded state and perform every write the outcome calls for.
    ///
    /// Child documents are rewritten one at a time; the proposed root is
    /// written once afterwards and only drops records whose child was
    /// rewritten.
    pub fn apply(
        &self,
        catalog: &AchievementCatalog,
        store: &DocumentStore,
    ) -> Result<MigrationReport> {
        let dry_run = self.config.dry_run;
        let reconciliation = reconcile(
            catalog.records(),
            store.modules(),
            store.learning_paths(),
        );
        let mut report = MigrationReport::new(
            catalog.path(),
            dry_run,
            self.config.record_boundary,
            &reconciliation,
        );

        for (achievement, documents) in reconciliation.conflicted() {
            log::warn!(
                "{} is claimed by {} documents; leaving it in place",
                achievement.uid,
                documents.len()
            );
        }

        let mut stripped: HashSet<&str> = HashSet::new();
        for (entry, (achievement, document)) in report
            .migrated
            .iter_mut()
            .zip(reconciliation.migrated())
        {
            match self.migrate_child(document, achievement) {
                Ok(()) => {
                    entry.applied = !dry_run;
                    stripped.insert(achievement.uid.as_str());
                }
                Err(err) => {
                    log::warn!("Could not migrate {}: {err}", achievement.uid);
                    report.write_failures.push(WriteFailure {
                        uid: achievement.uid.clone(),
                        document: document.path(),
                        error: err.to_string(),
                    });
                }
            }
        }
        report.totals.write_failures = report.write_failures.len();

        let root = patch_root(catalog.source(), &stripped, self.config.record_boundary);
        if root.removed.len() != stripped.len() {
            log::warn!(
                "Removed {} root records for {} migrated achievements",
                root.removed.len(),
                stripped.len()
            );
        }
        report.removed_records = root.removed;

        if !dry_run {
            let path = &self.config.proposed_root_path;
            write_artifact(path, &root.patched.render())?;
            log::info!("Wrote proposed achievements to {}", path.display());
            report.proposed_root_path = Some(path.clone());

            if let Some(path) = &self.config.deprecated_path {
                if !report.deprecated.is_empty() {
                    write_artifact(path, &render_deprecated_document(&report.deprecated)?)?;
                    log::info!("Wrote deprecated achievements to {}", path.display());
                    report.deprecated_path = Some(path.clone());
                }
            }
        }

        Ok(report)
    }

    fn migrate_child(
        &self,
        document: &ChildDocument,
        achievement: &AchievementRecord,
    ) -> Result<()> {
        let patch = patch_child(document, achievement)?;
        if self.config.dry_run {
            log::debug!("Would migrate {} into {}", achievement.uid, patch.location);
            return Ok(());
        }
        write_atomic(&patch.location.path(), &patch.patched.render())?;
        log::info!("Migrated {} into {}", achievement.uid, patch.location);
        Ok(())
    }
}
