use crate::lines::LineDocument;
use crate::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Achievement type as written in the `type:` field.
///
/// Only `badge` and `trophy` bind to a document pool; any other value is kept
/// verbatim so it can be reported and never matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AchievementKind {
    Badge,
    Trophy,
    Other(String),
}

impl AchievementKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Badge => "badge",
            Self::Trophy => "trophy",
            Self::Other(raw) => raw,
        }
    }

    /// Key of the block a claiming document receives, if the kind has one.
    pub const fn block_key(&self) -> Option<&'static str> {
        match self {
            Self::Badge => Some("badge"),
            Self::Trophy => Some("trophy"),
            Self::Other(_) => None,
        }
    }
}

impl Default for AchievementKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for AchievementKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "badge" => Self::Badge,
            "trophy" => Self::Trophy,
            _ => Self::Other(raw),
        }
    }
}

impl From<AchievementKind> for String {
    fn from(kind: AchievementKind) -> Self {
        match kind {
            AchievementKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the root `achievements:` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub uid: String,
    #[serde(rename = "type", default)]
    pub kind: AchievementKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "iconUrl", default)]
    pub icon_url: String,
}

impl AchievementRecord {
    pub fn new(uid: impl Into<String>, kind: AchievementKind) -> Self {
        Self {
            uid: uid.into(),
            kind,
            title: String::new(),
            summary: String::new(),
            icon_url: String::new(),
        }
    }
}

#[derive(Deserialize)]
struct AchievementsFile {
    #[serde(default)]
    achievements: Vec<AchievementRecord>,
}

/// Root achievements document: typed records plus the literal lines they came from.
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    path: PathBuf,
    records: Vec<AchievementRecord>,
    source: LineDocument,
}

impl AchievementCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let source = LineDocument::read(path)?;
        Self::from_source(path, source)
    }

    pub fn from_source(path: impl Into<PathBuf>, source: LineDocument) -> Result<Self> {
        let path = path.into();
        let file: AchievementsFile = serde_yaml::from_str(&source.render())
            .map_err(|err| MigrateError::parse(&path, err))?;
        log::info!(
            "Loaded {} achievements from {}",
            file.achievements.len(),
            path.display()
        );
        Ok(Self {
            path,
            records: file.achievements,
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[AchievementRecord] {
        &self.records
    }

    pub fn source(&self) -> &LineDocument {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn badges(&self) -> impl Iterator<Item = &AchievementRecord> + '_ {
        self.records
            .iter()
            .filter(|record| record.kind == AchievementKind::Badge)
    }

    pub fn trophies(&self) -> impl Iterator<Item = &AchievementRecord> + '_ {
        self.records
            .iter()
            .filter(|record| record.kind == AchievementKind::Trophy)
    }

    pub fn other_kinds(&self) -> impl Iterator<Item = &AchievementRecord> + '_ {
        self.records
            .iter()
            .filter(|record| record.kind.block_key().is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROOT: &str = "\
# Achievements for every module and learning path.
achievements:
- uid: learn.intro.badge
  type: badge
  title: Intro
  summary: Intro badge.
  iconUrl: /badges/intro.svg
- uid: learn.path.trophy
  type: trophy
  title: Path
  summary: Path trophy.
  iconUrl: /trophies/path.svg
- uid: learn.odd.medal
  type: medal
  title: Odd
  summary: Unknown kind.
  iconUrl: /odd.svg
";

    #[test]
    fn loads_records_and_partitions_by_kind() {
        let catalog =
            AchievementCatalog::from_source("achievements.yml", LineDocument::parse(ROOT))
                .unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.badges().map(|r| r.uid.as_str()).collect::<Vec<_>>(),
            vec!["learn.intro.badge"]
        );
        assert_eq!(
            catalog.trophies().map(|r| r.uid.as_str()).collect::<Vec<_>>(),
            vec!["learn.path.trophy"]
        );
        let other: Vec<_> = catalog.other_kinds().collect();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].kind, AchievementKind::Other("medal".into()));
        assert_eq!(catalog.records()[0].icon_url, "/badges/intro.svg");
        assert_eq!(catalog.source().render(), ROOT);
    }

    #[test]
    fn kind_matching_is_exact() {
        assert_eq!(
            AchievementKind::from("Badge".to_string()),
            AchievementKind::Other("Badge".into())
        );
        assert_eq!(String::from(AchievementKind::Trophy), "trophy");
    }

    #[test]
    fn malformed_root_is_a_parse_error() {
        let err = AchievementCatalog::from_source(
            "broken.yml",
            LineDocument::parse("achievements:\n- uid: [unterminated\n"),
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::Parse { .. }));
        assert!(err.to_string().contains("broken.yml"));
    }
}
