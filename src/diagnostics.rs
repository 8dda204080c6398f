//! Diagnostics carried as data through the pipeline.
//!
//! Resolution failures, analyzer findings, and inference warnings all use the
//! same issue record. Nothing in the library aborts on a bad route: stages
//! append issues and keep going, and the CLI decides at the end whether the
//! batch fails.

use serde::Serialize;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Will fail the batch.
    Error,
    /// Reported, does not block generation.
    Warning,
    /// Best practice note.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// One finding, tied to the declaration it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Where the issue occurred (e.g. `route:pets::CreatePet`,
    /// `handler:pets::CreatePetHandler`).
    pub location: String,
    pub severity: Severity,
    /// Stable issue kind (e.g. `missing_handler`, `duplicate_route`).
    pub kind: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        location: impl Into<String>,
        severity: Severity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn error(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(location, Severity::Error, kind, message)
    }

    pub fn warning(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(location, Severity::Warning, kind, message)
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[must_use]
pub fn has_errors(issues: &[Diagnostic]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[must_use]
pub fn has_warnings(issues: &[Diagnostic]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Warning)
}

/// Print diagnostics grouped by severity.
pub fn print_diagnostics(issues: &[Diagnostic]) {
    if issues.is_empty() {
        println!("✅ No issues found");
        return;
    }

    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .collect();
    let warnings: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == Severity::Warning)
        .collect();
    let infos: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == Severity::Info)
        .collect();

    println!(
        "\n📋 {} error(s), {} warning(s), {} info(s)\n",
        errors.len(),
        warnings.len(),
        infos.len()
    );

    for (header, group) in [
        ("❌ Errors:", errors),
        ("⚠️  Warnings:", warnings),
        ("ℹ️  Info:", infos),
    ] {
        if group.is_empty() {
            continue;
        }
        println!("{header}");
        for issue in group {
            println!("   [{}] {}", issue.kind, issue.location);
            println!("      {}", issue.message);
            if let Some(suggestion) = &issue.suggestion {
                println!("      💡 Suggestion: {suggestion}");
            }
        }
        println!();
    }
}
