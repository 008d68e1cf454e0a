use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MigrateError>;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("invalid configuration:\n{}", render_problems(.0))]
    Configuration(Vec<ConfigProblem>),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(
        "expected one top-level `achievement:` line in {}, found {found}",
        path.display()
    )]
    ReferenceLine { path: PathBuf, found: usize },

    #[error("achievement kind `{0}` has no document block")]
    UnsupportedKind(String),

    #[error("load task failed: {0}")]
    Join(String),
}

impl MigrateError {
    pub fn parse(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// One offending input path found while validating a [`crate::MigrateConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    AchievementsNotFound(PathBuf),
    AchievementsNotAFile(PathBuf),
    ModulesNotFound(PathBuf),
    LearningPathsNotFound(PathBuf),
    ProposedOverwritesRoot(PathBuf),
    EmptyFileName,
    ZeroRecordLines,
}

impl fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AchievementsNotFound(path) => {
                write!(f, "achievements file not found: {}", path.display())
            }
            Self::AchievementsNotAFile(path) => {
                write!(f, "achievements path is not a file: {}", path.display())
            }
            Self::ModulesNotFound(path) => {
                write!(f, "modules directory not found: {}", path.display())
            }
            Self::LearningPathsNotFound(path) => {
                write!(f, "learning paths directory not found: {}", path.display())
            }
            Self::ProposedOverwritesRoot(path) => write!(
                f,
                "proposed root must not overwrite the achievements file: {}",
                path.display()
            ),
            Self::EmptyFileName => f.write_str("document file name must not be empty"),
            Self::ZeroRecordLines => f.write_str("record line count must be at least 1"),
        }
    }
}

fn render_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(|problem| format!("  - {problem}"))
        .collect::<Vec<_>>()
        .join("\n")
}
