use crate::achievement::AchievementKind;
use crate::lines::LineDocument;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of a child document in the reference layout.
pub const DEFAULT_DOCUMENT_FILE_NAME: &str = "index.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Module,
    LearningPath,
}

impl DocumentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::LearningPath => "learning_path",
        }
    }

    /// Whether documents of this kind may claim achievements of `kind`.
    pub fn accepts(self, kind: &AchievementKind) -> bool {
        matches!(
            (self, kind),
            (Self::Module, AchievementKind::Badge) | (Self::LearningPath, AchievementKind::Trophy)
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory plus file name of a child document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentLocation {
    pub dir: PathBuf,
    pub file_name: String,
}

impl DocumentLocation {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

// Only the fields matching needs; everything else stays in the line view.
#[derive(Deserialize)]
struct ChildView {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    achievement: Option<serde_yaml::Value>,
}

/// A module or learning path document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDocument {
    location: DocumentLocation,
    kind: DocumentKind,
    uid: Option<String>,
    declared_achievement: Option<String>,
    source: LineDocument,
}

impl ChildDocument {
    pub fn load(location: DocumentLocation, kind: DocumentKind) -> Result<Self> {
        let source = LineDocument::read(&location.path())?;
        Ok(Self::from_source(location, kind, source))
    }

    /// Build the document from its literal lines.
    ///
    /// A document that does not parse, or whose `achievement` is not a
    /// non-empty scalar, is kept but declares nothing.
    pub fn from_source(location: DocumentLocation, kind: DocumentKind, source: LineDocument) -> Self {
        let (uid, declared_achievement) = match serde_yaml::from_str::<ChildView>(&source.render()) {
            Ok(view) => {
                let declared = match view.achievement {
                    Some(value) => match reference_text(&value) {
                        Some(raw) => Some(raw),
                        None => {
                            log::debug!(
                                "Ignoring non-scalar achievement reference in {location}: {value:?}"
                            );
                            None
                        }
                    },
                    None => None,
                };
                (view.uid, declared)
            }
            Err(err) => {
                log::debug!("Treating {location} as non-claiming: {err}");
                (None, None)
            }
        };

        Self {
            location,
            kind,
            uid,
            declared_achievement,
            source,
        }
    }

    pub fn location(&self) -> &DocumentLocation {
        &self.location
    }

    pub fn path(&self) -> PathBuf {
        self.location.path()
    }

    pub fn dir(&self) -> &Path {
        &self.location.dir
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn declared_achievement(&self) -> Option<&str> {
        self.declared_achievement.as_deref()
    }

    pub fn declares(&self, achievement_uid: &str) -> bool {
        self.declared_achievement.as_deref() == Some(achievement_uid)
    }

    pub fn source(&self) -> &LineDocument {
        &self.source
    }
}

// Plain scalars are read as their text, the way the root reads `uid`.
fn reference_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(raw) if !raw.is_empty() => Some(raw.clone()),
        serde_yaml::Value::Number(number) => Some(number.to_string()),
        serde_yaml::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
