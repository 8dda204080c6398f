//! Doc-comment splitting for registry metadata.

/// Parsed documentation for a declaration or member: the leading paragraph as
/// the summary and everything after the first blank line as remarks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub summary: String,
    pub remarks: String,
}

impl DocComment {
    /// Split raw doc text. Wrapped summary lines are joined with spaces so the
    /// summary stays a single line in emitted metadata; remarks keep their
    /// line structure.
    #[must_use]
    pub fn parse(doc: &str) -> Self {
        let trimmed = doc.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        let mut lines = trimmed.lines();
        let mut summary_lines: Vec<&str> = Vec::new();
        let mut rest: Vec<&str> = Vec::new();
        let mut in_summary = true;
        for line in lines.by_ref() {
            let line = line.trim_end();
            if in_summary {
                if line.trim().is_empty() {
                    in_summary = false;
                } else {
                    summary_lines.push(line.trim());
                }
            } else {
                rest.push(line);
            }
        }
        DocComment {
            summary: summary_lines.join(" "),
            remarks: rest.join("\n").trim().to_string(),
        }
    }
}
