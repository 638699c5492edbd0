//! Report rendering for the command line: compiler-style lines or one JSON document

use super::FileReport;
use serde::Serialize;
use std::fmt;

/// Totals over a set of file reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub files: usize,
    pub files_with_errors: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Files that could not be loaded at all
    pub failed: usize,
}

impl CheckSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.files += 1;
            if report.has_errors() {
                summary.files_with_errors += 1;
            }
            summary.errors += report.error_count();
            summary.warnings += report.warning_count();
            summary
        })
    }

    pub fn with_failed(mut self, failed: usize) -> Self {
        self.failed = failed;
        self
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.failed == 0
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) checked: {} error(s), {} warning(s)",
            self.files, self.errors, self.warnings
        )?;
        if self.failed > 0 {
            write!(f, ", {} file(s) could not be read", self.failed)?;
        }
        Ok(())
    }
}

/// `path:line:column: level[code]: message` per diagnostic, with the clipper field appended when there is one
pub fn format_human(report: &FileReport) -> String {
    let path = report.path.display();
    let mut out = String::new();

    for template in &report.templates {
        for diagnostic in template.diagnostics() {
            out.push_str(&format!("{}:{}", path, diagnostic));
            if let Some(field) = &template.field {
                out.push_str(&format!(" (in {})", field));
            }
            out.push('\n');
        }
    }

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: CheckSummary,
}

/// Pretty-printed `{ "files": [...], "summary": {...} }`
pub fn format_json(reports: &[FileReport], summary: CheckSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        files: reports,
        summary,
    })
}
