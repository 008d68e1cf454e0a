use crate::achievement::{AchievementKind, AchievementRecord};
use crate::document::ChildDocument;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Migrated,
    Deprecated,
    Conflicted,
}

/// Where one achievement ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// Exactly one document claims the achievement.
    Migrated {
        achievement: &'a AchievementRecord,
        document: &'a ChildDocument,
    },
    /// Nothing claims it.
    Deprecated { achievement: &'a AchievementRecord },
    /// Two or more documents claim it, in pool order.
    Conflicted {
        achievement: &'a AchievementRecord,
        documents: Vec<&'a ChildDocument>,
    },
}

impl<'a> MatchOutcome<'a> {
    pub fn achievement(&self) -> &'a AchievementRecord {
        match self {
            Self::Migrated { achievement, .. }
            | Self::Deprecated { achievement }
            | Self::Conflicted { achievement, .. } => achievement,
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Migrated { .. } => OutcomeStatus::Migrated,
            Self::Deprecated { .. } => OutcomeStatus::Deprecated,
            Self::Conflicted { .. } => OutcomeStatus::Conflicted,
        }
    }
}

/// Candidate documents for an achievement kind. Unknown kinds have none.
pub fn candidate_pool<'a>(
    kind: &AchievementKind,
    modules: &'a [ChildDocument],
    learning_paths: &'a [ChildDocument],
) -> &'a [ChildDocument] {
    match kind {
        AchievementKind::Badge => modules,
        AchievementKind::Trophy => learning_paths,
        AchievementKind::Other(_) => &[],
    }
}

/// Classify a single achievement against the candidate pools.
pub fn classify<'a>(
    achievement: &'a AchievementRecord,
    modules: &'a [ChildDocument],
    learning_paths: &'a [ChildDocument],
) -> MatchOutcome<'a> {
    let mut matches: Vec<&'a ChildDocument> =
        candidate_pool(&achievement.kind, modules, learning_paths)
            .iter()
            .filter(|doc| doc.declares(&achievement.uid))
            .collect();

    match matches.len() {
        0 => MatchOutcome::Deprecated { achievement },
        1 => MatchOutcome::Migrated {
            achievement,
            document: matches.remove(0),
        },
        _ => MatchOutcome::Conflicted {
            achievement,
            documents: matches,
        },
    }
}

/// Full matching, one outcome per achievement in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation<'a> {
    outcomes: Vec<MatchOutcome<'a>>,
}

/// Match every achievement to the documents that declare it.
///
/// Pure: reads the loaded records and documents, touches nothing else.
pub fn reconcile<'a>(
    achievements: &'a [AchievementRecord],
    modules: &'a [ChildDocument],
    learning_paths: &'a [ChildDocument],
) -> Reconciliation<'a> {
    Reconciliation {
        outcomes: achievements
            .iter()
            .map(|achievement| classify(achievement, modules, learning_paths))
            .collect(),
    }
}

impl<'a> Reconciliation<'a> {
    pub fn outcomes(&self) -> &[MatchOutcome<'a>] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn migrated(
        &self,
    ) -> impl Iterator<Item = (&'a AchievementRecord, &'a ChildDocument)> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            MatchOutcome::Migrated {
                achievement,
                document,
            } => Some((*achievement, *document)),
            _ => None,
        })
    }

    pub fn deprecated(&self) -> impl Iterator<Item = &'a AchievementRecord> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            MatchOutcome::Deprecated { achievement } => Some(*achievement),
            _ => None,
        })
    }

    pub fn conflicted(
        &self,
    ) -> impl Iterator<Item = (&'a AchievementRecord, &[&'a ChildDocument])> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            MatchOutcome::Conflicted {
                achievement,
                documents,
            } => Some((*achievement, documents.as_slice())),
            _ => None,
        })
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status() == status)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentKind, DocumentLocation, DEFAULT_DOCUMENT_FILE_NAME};
    use crate::lines::LineDocument;
    use pretty_assertions::assert_eq;

    fn doc(dir: &str, kind: DocumentKind, reference: Option<&str>) -> ChildDocument {
        let text = match reference {
            Some(id) => format!("uid: {dir}\nachievement: {id}\n"),
            None => format!("uid: {dir}\n"),
        };
        ChildDocument::from_source(
            DocumentLocation::new(dir, DEFAULT_DOCUMENT_FILE_NAME),
            kind,
            LineDocument::parse(&text),
        )
    }

    fn badge(uid: &str) -> AchievementRecord {
        AchievementRecord::new(uid, AchievementKind::Badge)
    }

    fn trophy(uid: &str) -> AchievementRecord {
        AchievementRecord::new(uid, AchievementKind::Trophy)
    }

    #[test]
    fn single_claim_migrates() {
        let achievements = vec![badge("a.badge")];
        let modules = vec![
            doc("m1", DocumentKind::Module, None),
            doc("m2", DocumentKind::Module, Some("a.badge")),
        ];
        let result = reconcile(&achievements, &modules, &[]);
        let migrated: Vec<_> = result.migrated().collect();
        assert_eq!(migrated.len(), 1);
        assert_eq!(migrated[0].0.uid, "a.badge");
        assert_eq!(migrated[0].1.location().dir.to_str(), Some("m2"));
        assert_eq!(result.count(OutcomeStatus::Deprecated), 0);
    }

    #[test]
    fn conflict_lists_every_claim_in_pool_order() {
        let achievements = vec![badge("x")];
        let modules = vec![
            doc("m1", DocumentKind::Module, Some("x")),
            doc("m2", DocumentKind::Module, Some("y")),
            doc("m3", DocumentKind::Module, Some("x")),
        ];
        let result = reconcile(&achievements, &modules, &[]);
        let conflicted: Vec<_> = result.conflicted().collect();
        assert_eq!(conflicted.len(), 1);
        let dirs: Vec<_> = conflicted[0]
            .1
            .iter()
            .map(|d| d.location().dir.to_string_lossy().into_owned())
            .collect();
        assert_eq!(dirs, vec!["m1", "m3"]);
        assert_eq!(result.migrated().count(), 0);
    }

    #[test]
    fn pools_are_chosen_by_kind() {
        let achievements = vec![badge("shared"), trophy("shared.trophy")];
        let modules = vec![doc("m", DocumentKind::Module, Some("shared.trophy"))];
        let paths = vec![doc("p", DocumentKind::LearningPath, Some("shared"))];
        let result = reconcile(&achievements, &modules, &paths);
        assert_eq!(
            result.outcomes().iter().map(MatchOutcome::status).collect::<Vec<_>>(),
            vec![OutcomeStatus::Deprecated, OutcomeStatus::Deprecated]
        );
    }

    #[test]
    fn trophies_match_learning_paths() {
        let achievements = vec![trophy("p.trophy")];
        let paths = vec![doc("p", DocumentKind::LearningPath, Some("p.trophy"))];
        let result = reconcile(&achievements, &[], &paths);
        assert_eq!(result.count(OutcomeStatus::Migrated), 1);
    }

    #[test]
    fn unknown_kind_is_deprecated() {
        let achievements = vec![AchievementRecord::new(
            "odd",
            AchievementKind::Other("medal".into()),
        )];
        let modules = vec![doc("m", DocumentKind::Module, Some("odd"))];
        let paths = vec![doc("p", DocumentKind::LearningPath, Some("odd"))];
        let result = reconcile(&achievements, &modules, &paths);
        assert_eq!(
            result.deprecated().map(|a| a.uid.as_str()).collect::<Vec<_>>(),
            vec!["odd"]
        );
    }

    #[test]
    fn matching_is_exact() {
        let achievements = vec![badge("Learn.A")];
        let modules = vec![
            doc("m1", DocumentKind::Module, Some("learn.a")),
            doc("m2", DocumentKind::Module, Some("'Learn.A '")),
        ];
        let result = reconcile(&achievements, &modules, &[]);
        assert_eq!(result.count(OutcomeStatus::Deprecated), 1);
    }

    #[test]
    fn outcomes_follow_catalog_order() {
        let achievements = vec![badge("c"), badge("a"), badge("b")];
        let modules = vec![
            doc("m1", DocumentKind::Module, Some("a")),
            doc("m2", DocumentKind::Module, Some("b")),
            doc("m3", DocumentKind::Module, Some("b")),
        ];
        let result = reconcile(&achievements, &modules, &[]);
        let order: Vec<_> = result
            .outcomes()
            .iter()
            .map(|o| (o.achievement().uid.as_str(), o.status()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("c", OutcomeStatus::Deprecated),
                ("a", OutcomeStatus::Migrated),
                ("b", OutcomeStatus::Conflicted),
            ]
        );
    }
}
