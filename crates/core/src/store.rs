use crate::achievement::AchievementKind;
use crate::config::MigrateConfig;
use crate::document::{ChildDocument, DocumentKind, DocumentLocation};
use crate::limits::LoadLimiter;
use crate::reconcile::candidate_pool;
use crate::{MigrateError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds and loads the child documents under a set of roots.
pub struct DocumentScanner {
    file_name: String,
    limiter: LoadLimiter,
}

impl DocumentScanner {
    pub fn new(file_name: impl Into<String>, load_concurrency: usize) -> Self {
        Self {
            file_name: file_name.into(),
            limiter: LoadLimiter::new(load_concurrency),
        }
    }

    /// Immediate, non-hidden subdirectories of `root`, sorted by name.
    pub fn candidate_dirs(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
            {
                continue;
            }
            dirs.push(entry.into_path());
        }
        Ok(dirs)
    }

    /// Load every document under `roots`, in root order then directory order.
    ///
    /// Directories without the document, and documents that cannot be read,
    /// are left out.
    pub async fn load_pool(
        &self,
        roots: &[PathBuf],
        kind: DocumentKind,
    ) -> Result<Vec<ChildDocument>> {
        let mut dirs = Vec::new();
        for root in roots {
            dirs.extend(self.candidate_dirs(root)?);
        }

        let mut handles = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let permit = self.limiter.acquire().await;
            let location = DocumentLocation::new(dir, self.file_name.clone());
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                load_one(location, kind)
            }));
        }

        let mut documents = Vec::with_capacity(handles.len());
        for handle in handles {
            let loaded = handle
                .await
                .map_err(|err| MigrateError::Join(err.to_string()))?;
            documents.extend(loaded);
        }

        let claiming = documents
            .iter()
            .filter(|doc| doc.declared_achievement().is_some())
            .count();
        log::info!(
            "Loaded {} {} documents ({} declare an achievement)",
            documents.len(),
            kind,
            claiming
        );
        Ok(documents)
    }
}

fn load_one(location: DocumentLocation, kind: DocumentKind) -> Option<ChildDocument> {
    let path = location.path();
    if !path.is_file() {
        log::debug!("No {} in {}", location.file_name, location.dir.display());
        return None;
    }
    match ChildDocument::load(location, kind) {
        Ok(doc) => Some(doc),
        Err(err) => {
            log::debug!("Skipping unreadable document: {err}");
            None
        }
    }
}

/// Both candidate pools, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    modules: Vec<ChildDocument>,
    learning_paths: Vec<ChildDocument>,
}

impl DocumentStore {
    pub async fn load(config: &MigrateConfig) -> Result<Self> {
        let scanner = DocumentScanner::new(&config.document_file_name, config.load_concurrency);
        let modules = scanner
            .load_pool(&config.module_roots, DocumentKind::Module)
            .await?;
        let learning_paths = match &config.learning_path_root {
            Some(root) => {
                scanner
                    .load_pool(std::slice::from_ref(root), DocumentKind::LearningPath)
                    .await?
            }
            None => Vec::new(),
        };
        Ok(Self::from_documents(modules, learning_paths))
    }

    pub fn from_documents(
        modules: Vec<ChildDocument>,
        learning_paths: Vec<ChildDocument>,
    ) -> Self {
        Self {
            modules,
            learning_paths,
        }
    }

    pub fn modules(&self) -> &[ChildDocument] {
        &self.modules
    }

    pub fn learning_paths(&self) -> &[ChildDocument] {
        &self.learning_paths
    }

    pub fn pool_for(&self, kind: &AchievementKind) -> &[ChildDocument] {
        candidate_pool(kind, &self.modules, &self.learning_paths)
    }

    pub fn len(&self) -> usize {
        self.modules.len() + self.learning_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
