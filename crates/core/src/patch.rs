//! Line-literal edits.
//!
//! Nothing here re-serializes YAML: edits work on [`LineDocument`] lines so
//! comments, key order and formatting outside the edited region survive.

use crate::achievement::AchievementRecord;
use crate::document::{ChildDocument, DocumentLocation};
use crate::lines::{strip_terminator, LineDocument};
use crate::{MigrateError, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Top-level key through which a child document claims an achievement.
pub const REFERENCE_MARKER: &str = "achievement:";

/// First line of every record in the root collection.
pub const RECORD_START_MARKER: &str = "- uid:";

/// Lines in a badge/trophy record: uid, type, title, summary, iconUrl.
pub const RECORD_LINE_COUNT: usize = 5;

/// How far a root record extends past its `- uid:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecordBoundary {
    /// Every following line indented deeper than the record's dash.
    #[default]
    Indentation,
    /// Exactly `lines` lines starting at the marker, whatever they contain.
    FixedLines { lines: usize },
}

impl RecordBoundary {
    pub const fn fixed_record_shape() -> Self {
        Self::FixedLines {
            lines: RECORD_LINE_COUNT,
        }
    }
}

/// Rewritten child document, not yet persisted.
#[derive(Debug, Clone)]
pub struct ChildPatch {
    pub location: DocumentLocation,
    pub achievement_uid: String,
    pub removed_lines: usize,
    pub patched: LineDocument,
}

/// Move `achievement` into `document`: drop the reference line and append
/// the kind block carrying the achievement's uid.
///
/// Fails unless exactly one top-level `achievement:` line is found.
pub fn patch_child(
    document: &ChildDocument,
    achievement: &AchievementRecord,
) -> Result<ChildPatch> {
    let block_key = achievement
        .kind
        .block_key()
        .ok_or_else(|| MigrateError::UnsupportedKind(achievement.kind.to_string()))?;

    let lines = document.source().raw_lines();
    let mut kept = Vec::with_capacity(lines.len() + 2);
    let mut removed_lines = 0usize;
    let mut declarations = 0usize;
    let mut idx = 0usize;
    while idx < lines.len() {
        if strip_terminator(&lines[idx]).starts_with(REFERENCE_MARKER) {
            // A value continued on indented lines belongs to the declaration.
            let end = indented_block_end(lines, idx);
            declarations += 1;
            removed_lines += end - idx;
            idx = end;
            continue;
        }
        kept.push(lines[idx].clone());
        idx += 1;
    }

    // The structured view matched, but the literal marker must account for
    // exactly that one declaration or the document would claim twice.
    if declarations != 1 {
        return Err(MigrateError::ReferenceLine {
            path: document.path(),
            found: declarations,
        });
    }

    let ending = document.source().line_ending();
    let mut patched = LineDocument::from_raw(kept);
    patched.push_line_with(&format!("{block_key}:"), ending);
    patched.push_line_with(
        &format!("  uid: {}", yaml_scalar(&achievement.uid)),
        ending,
    );

    Ok(ChildPatch {
        location: document.location().clone(),
        achievement_uid: achievement.uid.clone(),
        removed_lines,
        patched,
    })
}

/// One record dropped from the root collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedRecord {
    pub uid: String,
    /// Zero-based index of the `- uid:` line in the input.
    pub first_line: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone)]
pub struct RootPatch {
    pub patched: LineDocument,
    pub removed: Vec<RemovedRecord>,
}

/// Strip every record whose uid is in `migrated` from the root lines.
///
/// Lines that are not record starts, and record starts whose uid cannot be
/// read, are copied through untouched.
pub fn patch_root(
    root: &LineDocument,
    migrated: &HashSet<&str>,
    boundary: RecordBoundary,
) -> RootPatch {
    let lines = root.raw_lines();
    let mut kept = Vec::with_capacity(lines.len());
    let mut removed = Vec::new();
    let mut idx = 0usize;

    while idx < lines.len() {
        let uid = record_uid(strip_terminator(&lines[idx]));
        match uid {
            Some(uid) if migrated.contains(uid) => {
                let end = match boundary {
                    RecordBoundary::FixedLines { lines: count } => {
                        (idx + count.max(1)).min(lines.len())
                    }
                    RecordBoundary::Indentation => indented_block_end(lines, idx),
                };
                log::debug!("Removing record {uid} (lines {}..{})", idx + 1, end);
                removed.push(RemovedRecord {
                    uid: uid.to_string(),
                    first_line: idx,
                    line_count: end - idx,
                });
                idx = end;
            }
            _ => {
                kept.push(lines[idx].clone());
                idx += 1;
            }
        }
    }

    RootPatch {
        patched: LineDocument::from_raw(kept),
        removed,
    }
}

/// Uid carried by a `- uid:` record-start line, if the line is one.
pub fn record_uid(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(RECORD_START_MARKER)?;
    let value = match rest.find(" #") {
        Some(pos) => &rest[..pos],
        None if rest.trim_start().starts_with('#') => "",
        None => rest,
    };
    let value = unquote(value.trim());
    (!value.is_empty()).then_some(value)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

// End (exclusive) of the block opened at `start`: following lines indented
// deeper than the opening line. Trailing blank lines stay outside the block.
fn indented_block_end(lines: &[String], start: usize) -> usize {
    let base = indentation(strip_terminator(&lines[start]));
    let mut last = start;
    for (offset, raw) in lines[start + 1..].iter().enumerate() {
        let line = strip_terminator(raw);
        if line.trim().is_empty() {
            continue;
        }
        if indentation(line) <= base {
            break;
        }
        last = start + 1 + offset;
    }
    last + 1
}

/// Render `value` as a YAML scalar, single-quoting it when a plain scalar
/// would be read back differently.
pub(crate) fn yaml_scalar(value: &str) -> String {
    if needs_quotes(value) {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
        '`',
    ];
    let Some(first) = value.chars().next() else {
        return true;
    };
    if INDICATORS.contains(&first) || value.trim() != value {
        return true;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return true;
    }
    if value.contains(['\n', '\r', '\t']) {
        return true;
    }
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~"
    ) || value.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievement::AchievementKind;
    use crate::document::{DocumentKind, DEFAULT_DOCUMENT_FILE_NAME};
    use pretty_assertions::assert_eq;

    fn module(text: &str) -> ChildDocument {
        ChildDocument::from_source(
            DocumentLocation::new("modules/intro", DEFAULT_DOCUMENT_FILE_NAME),
            DocumentKind::Module,
            LineDocument::parse(text),
        )
    }

    fn ids<'a>(values: &[&'a str]) -> HashSet<&'a str> {
        values.iter().copied().collect()
    }

    const MODULE: &str = "\
### YamlMime:Module
uid: learn.intro
metadata:
  title: Intro   # keep this comment
  ms.date: 01/01/2019
achievement: learn.intro.badge
units:
- learn.intro.1
- learn.intro.2
";

    #[test]
    fn child_patch_moves_reference_into_badge_block() {
        let doc = module(MODULE);
        let badge = AchievementRecord::new("learn.intro.badge", AchievementKind::Badge);
        let patch = patch_child(&doc, &badge).unwrap();

        assert_eq!(patch.removed_lines, 1);
        assert_eq!(patch.achievement_uid, "learn.intro.badge");
        assert_eq!(
            patch.patched.render(),
            "\
### YamlMime:Module
uid: learn.intro
metadata:
  title: Intro   # keep this comment
  ms.date: 01/01/2019
units:
- learn.intro.1
- learn.intro.2
badge:
  uid: learn.intro.badge
"
        );
    }

    #[test]
    fn child_patch_uses_trophy_block_and_document_line_endings() {
        let doc = ChildDocument::from_source(
            DocumentLocation::new("paths/azure", DEFAULT_DOCUMENT_FILE_NAME),
            DocumentKind::LearningPath,
            LineDocument::parse("uid: learn.azure\r\nachievement: learn.azure.trophy\r\nmodules:\r\n- a"),
        );
        let trophy = AchievementRecord::new("learn.azure.trophy", AchievementKind::Trophy);
        let patch = patch_child(&doc, &trophy).unwrap();
        assert_eq!(
            patch.patched.render(),
            "uid: learn.azure\r\nmodules:\r\n- a\r\ntrophy:\r\n  uid: learn.azure.trophy\r\n"
        );
    }

    #[test]
    fn child_patch_leaves_nested_achievement_keys_alone() {
        let doc = module("uid: m\nextra:\n  achievement: nested\nachievement: top\n");
        let badge = AchievementRecord::new("top", AchievementKind::Badge);
        let patch = patch_child(&doc, &badge).unwrap();
        assert_eq!(
            patch.patched.render(),
            "uid: m\nextra:\n  achievement: nested\nbadge:\n  uid: top\n"
        );
    }

    #[test]
    fn child_patch_removes_continued_reference_value() {
        let doc = module("uid: m\nachievement:\n  learn.m.badge\ntitle: M\n");
        assert_eq!(doc.declared_achievement(), Some("learn.m.badge"));
        let badge = AchievementRecord::new("learn.m.badge", AchievementKind::Badge);
        let patch = patch_child(&doc, &badge).unwrap();
        assert_eq!(patch.removed_lines, 2);
        assert_eq!(patch.patched.render(), "uid: m\ntitle: M\nbadge:\n  uid: learn.m.badge\n");
    }

    #[test]
    fn child_patch_requires_a_literal_reference_line() {
        let badge = AchievementRecord::new("x.badge", AchievementKind::Badge);
        for text in [
            "uid: m\nachievement : x.badge\n",
            "uid: m\n\"achievement\": x.badge\n",
        ] {
            let doc = module(text);
            assert_eq!(doc.declared_achievement(), Some("x.badge"));
            let err = patch_child(&doc, &badge).unwrap_err();
            assert!(
                matches!(err, MigrateError::ReferenceLine { found: 0, .. }),
                "unexpected result for {text:?}: {err}"
            );
        }
    }

    #[test]
    fn child_patch_rejects_unknown_kind() {
        let doc = module(MODULE);
        let odd = AchievementRecord::new("learn.intro.badge", AchievementKind::Other("medal".into()));
        let err = patch_child(&doc, &odd).unwrap_err();
        assert!(matches!(err, MigrateError::UnsupportedKind(kind) if kind == "medal"));
    }

    const ROOT: &str = "\
# Root collection
achievements:
- uid: learn.a.badge
  type: badge
  title: A
  summary: A badge.
  iconUrl: /a.svg
- uid: learn.b.badge
  type: badge
  title: B
  summary: B badge.
  iconUrl: /b.svg
# trailing note
";

    #[test]
    fn fixed_lines_boundary_drops_five_line_record() {
        let root = LineDocument::parse(ROOT);
        let patch = patch_root(&root, &ids(&["learn.a.badge"]), RecordBoundary::fixed_record_shape());
        assert_eq!(
            patch.patched.render(),
            "\
# Root collection
achievements:
- uid: learn.b.badge
  type: badge
  title: B
  summary: B badge.
  iconUrl: /b.svg
# trailing note
"
        );
        assert_eq!(
            patch.removed,
            vec![RemovedRecord {
                uid: "learn.a.badge".into(),
                first_line: 2,
                line_count: 5,
            }]
        );
    }

    #[test]
    fn indentation_boundary_matches_fixed_shape_on_regular_records() {
        let root = LineDocument::parse(ROOT);
        let migrated = ids(&["learn.a.badge", "learn.b.badge"]);
        let fixed = patch_root(&root, &migrated, RecordBoundary::fixed_record_shape());
        let indented = patch_root(&root, &migrated, RecordBoundary::Indentation);
        assert_eq!(fixed.patched, indented.patched);
        assert_eq!(
            indented.patched.render(),
            "# Root collection\nachievements:\n# trailing note\n"
        );
    }

    #[test]
    fn indentation_boundary_handles_irregular_records() {
        let root = LineDocument::parse(
            "\
achievements:
  - uid: 'learn.a.badge'   # quoted
    type: badge
    summary: >
      Folded summary

      spanning paragraphs.
    iconUrl: /a.svg

  - uid: learn.b.badge
    type: badge
",
        );
        let patch = patch_root(&root, &ids(&["learn.a.badge"]), RecordBoundary::Indentation);
        assert_eq!(
            patch.patched.render(),
            "achievements:\n\n  - uid: learn.b.badge\n    type: badge\n"
        );
        assert_eq!(patch.removed[0].line_count, 7);
    }

    #[test]
    fn root_patch_is_idempotent() {
        let root = LineDocument::parse(ROOT);
        let migrated = ids(&["learn.a.badge"]);
        let once = patch_root(&root, &migrated, RecordBoundary::Indentation);
        let twice = patch_root(&once.patched, &migrated, RecordBoundary::Indentation);
        assert!(twice.removed.is_empty());
        assert_eq!(twice.patched, once.patched);
    }

    #[test]
    fn unreadable_record_start_is_copied_through() {
        let root = LineDocument::parse("- uid:\n  type: badge\n- uid: # nothing\n");
        let patch = patch_root(&root, &ids(&[""]), RecordBoundary::Indentation);
        assert!(patch.removed.is_empty());
        assert_eq!(patch.patched.render(), root.render());
    }

    #[test]
    fn record_uid_extraction() {
        assert_eq!(record_uid("- uid: learn.a.badge"), Some("learn.a.badge"));
        assert_eq!(record_uid("  - uid:   \"learn.q\"  "), Some("learn.q"));
        assert_eq!(record_uid("- uid: learn.c # note"), Some("learn.c"));
        assert_eq!(record_uid("  uid: learn.a.badge"), None);
        assert_eq!(record_uid("- uid:"), None);
    }

    #[test]
    fn scalars_are_quoted_only_when_needed() {
        assert_eq!(yaml_scalar("learn.intro.badge"), "learn.intro.badge");
        assert_eq!(yaml_scalar("true"), "'true'");
        assert_eq!(yaml_scalar("12"), "'12'");
        assert_eq!(yaml_scalar("a: b"), "'a: b'");
        assert_eq!(yaml_scalar("it's"), "it's");
        assert_eq!(yaml_scalar("'quoted'"), "'''quoted'''");
    }
}
