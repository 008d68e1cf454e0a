use achievement_migrate_core::MigrationReport;

/// Plain-text run summary for the terminal.
pub fn render_summary(report: &MigrationReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Migrated achievements ({}):\n", report.migrated.len()));
    for entry in &report.migrated {
        let marker = if entry.applied { "" } else { " (not written)" };
        out.push_str(&format!(
            "  {} ({}) -> {}{}\n",
            entry.uid,
            entry.kind,
            entry.document.display(),
            marker
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "Achievements considered deprecated ({}):\n",
        report.deprecated.len()
    ));
    for achievement in &report.deprecated {
        out.push_str(&format!(
            "  {} ({})\n",
            achievement.uid,
            kind_label(achievement.kind.as_str())
        ));
    }
    out.push('\n');

    let issues = report.conflicted.len() + report.write_failures.len();
    out.push_str(&format!("Achievements with issues ({issues}):\n"));
    for conflict in &report.conflicted {
        out.push_str(&format!(
            "  {} ({}) is claimed by {} documents:\n",
            conflict.uid,
            conflict.kind,
            conflict.documents.len()
        ));
        for document in &conflict.documents {
            out.push_str(&format!("    {}\n", document.display()));
        }
    }
    for failure in &report.write_failures {
        out.push_str(&format!(
            "  {} could not be written to {}: {}\n",
            failure.uid,
            failure.document.display(),
            failure.error
        ));
    }
    out.push('\n');

    let totals = &report.totals;
    out.push_str(&format!(
        "Summary: {} achievements, {} migrated, {} deprecated, {} conflicted, {} write failures\n",
        totals.achievements,
        totals.migrated,
        totals.deprecated,
        totals.conflicted,
        totals.write_failures
    ));

    if report.dry_run {
        out.push_str("Dry run: no files were written.\n");
    }
    if let Some(path) = &report.proposed_root_path {
        out.push_str(&format!("Proposed achievements: {}\n", path.display()));
    }
    if let Some(path) = &report.deprecated_path {
        out.push_str(&format!("Deprecated achievements: {}\n", path.display()));
    }

    out
}

fn kind_label(kind: &str) -> &str {
    if kind.is_empty() {
        "no type"
    } else {
        kind
    }
}
