use crate::{MigrateError, Result};
use std::path::Path;

/// Literal view of a document.
///
/// Every line keeps its own terminator, so rendering an untouched document
/// reproduces the input byte-for-byte, mixed line endings included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDocument {
    lines: Vec<String>,
}

impl LineDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_owned).collect(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| MigrateError::parse(path, format!("read failed: {err}")))?;
        Ok(Self::parse(&text))
    }

    pub(crate) fn from_raw(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Line contents without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|line| strip_terminator(line))
    }

    pub fn raw_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Terminator used for appended lines: the first one found in the document.
    pub fn line_ending(&self) -> &'static str {
        self.lines
            .iter()
            .find(|line| line.ends_with('\n'))
            .map(|line| if line.ends_with("\r\n") { "\r\n" } else { "\n" })
            .unwrap_or("\n")
    }

    /// Append `text` terminated by `ending`, terminating an open tail first.
    pub(crate) fn push_line_with(&mut self, text: &str, ending: &str) {
        if let Some(last) = self.lines.last_mut() {
            if !last.ends_with('\n') {
                last.push_str(ending);
            }
        }
        self.lines.push(format!("{text}{ending}"));
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }
}

pub(crate) fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line)
}
