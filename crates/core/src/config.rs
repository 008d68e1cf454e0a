use crate::document::DEFAULT_DOCUMENT_FILE_NAME;
use crate::error::ConfigProblem;
use crate::fsio::sibling_artifact;
use crate::limits::default_load_concurrency;
use crate::patch::RecordBoundary;
use crate::{MigrateError, Result};
use std::path::{Path, PathBuf};

/// Everything a run needs, fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateConfig {
    /// Root achievements document.
    pub achievements_path: PathBuf,

    /// Directories whose subdirectories hold module documents.
    pub module_roots: Vec<PathBuf>,

    /// Directory whose subdirectories hold learning path documents.
    pub learning_path_root: Option<PathBuf>,

    /// Child document file name inside each subdirectory.
    pub document_file_name: String,

    /// Where the root collection minus migrated records is written.
    pub proposed_root_path: PathBuf,

    /// Where unclaimed achievements are written, if anywhere.
    pub deprecated_path: Option<PathBuf>,

    pub record_boundary: RecordBoundary,

    /// Reconcile and report without writing anything.
    pub dry_run: bool,

    /// Child documents read in parallel during loading.
    pub load_concurrency: usize,
}

impl MigrateConfig {
    pub fn new(achievements_path: impl Into<PathBuf>) -> Self {
        let achievements_path = achievements_path.into();
        Self {
            proposed_root_path: sibling_artifact(&achievements_path, "next"),
            achievements_path,
            module_roots: Vec::new(),
            learning_path_root: None,
            document_file_name: DEFAULT_DOCUMENT_FILE_NAME.to_string(),
            deprecated_path: None,
            record_boundary: RecordBoundary::default(),
            dry_run: false,
            load_concurrency: default_load_concurrency(),
        }
    }

    pub fn with_module_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.module_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_learning_path_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.learning_path_root = Some(root.into());
        self
    }

    pub fn with_document_file_name(mut self, name: impl Into<String>) -> Self {
        self.document_file_name = name.into();
        self
    }

    pub fn with_proposed_root_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.proposed_root_path = path.into();
        self
    }

    pub fn with_deprecated_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.deprecated_path = Some(path.into());
        self
    }

    /// Write the deprecated document beside the achievements file.
    pub fn with_default_deprecated_path(self) -> Self {
        let path = sibling_artifact(&self.achievements_path, "deprecated");
        self.with_deprecated_path(path)
    }

    pub fn with_record_boundary(mut self, boundary: RecordBoundary) -> Self {
        self.record_boundary = boundary;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_load_concurrency(mut self, limit: usize) -> Self {
        self.load_concurrency = limit.max(1);
        self
    }

    /// Check every input path, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(MigrateError::Configuration(problems))
        }
    }

    pub fn problems(&self) -> Vec<ConfigProblem> {
        let mut problems = Vec::new();

        if !self.achievements_path.exists() {
            problems.push(ConfigProblem::AchievementsNotFound(
                self.achievements_path.clone(),
            ));
        } else if !self.achievements_path.is_file() {
            problems.push(ConfigProblem::AchievementsNotAFile(
                self.achievements_path.clone(),
            ));
        }

        for root in &self.module_roots {
            if !root.is_dir() {
                problems.push(ConfigProblem::ModulesNotFound(root.clone()));
            }
        }

        if let Some(root) = &self.learning_path_root {
            if !root.is_dir() {
                problems.push(ConfigProblem::LearningPathsNotFound(root.clone()));
            }
        }

        if same_file(&self.proposed_root_path, &self.achievements_path) {
            problems.push(ConfigProblem::ProposedOverwritesRoot(
                self.proposed_root_path.clone(),
            ));
        }

        if self.document_file_name.trim().is_empty() {
            problems.push(ConfigProblem::EmptyFileName);
        }

        if self.record_boundary == (RecordBoundary::FixedLines { lines: 0 }) {
            problems.push(ConfigProblem::ZeroRecordLines);
        }

        problems
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
