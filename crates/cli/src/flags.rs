use achievement_migrate_core::{RecordBoundary, RECORD_LINE_COUNT};
use clap::ValueEnum;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum RecordBoundaryFlag {
    Indentation,
    Fixed,
}

impl RecordBoundaryFlag {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            RecordBoundaryFlag::Indentation => "indentation",
            RecordBoundaryFlag::Fixed => "fixed",
        }
    }

    /// An explicit line count always selects the fixed boundary.
    pub(crate) fn as_domain(flag: Option<Self>, record_lines: Option<usize>) -> RecordBoundary {
        match (flag, record_lines) {
            (_, Some(lines)) => RecordBoundary::FixedLines { lines },
            (Some(RecordBoundaryFlag::Fixed), None) => RecordBoundary::FixedLines {
                lines: RECORD_LINE_COUNT,
            },
            (Some(RecordBoundaryFlag::Indentation) | None, None) => RecordBoundary::Indentation,
        }
    }
}
