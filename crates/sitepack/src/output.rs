//! Terminal reporting for CLI commands.
//!
//! Progress and diagnostics go to stderr; file listings go to stdout so they
//! can be piped.

use std::path::Path;

use console::{Style, Term};
use sitepack_export::StaticExport;

pub(crate) struct Output {
    stderr: Term,
    stdout: Term,
    green: Style,
    red: Style,
    dim: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            stdout: Term::stdout(),
            green: Style::new().green(),
            red: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Print a status line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.stderr.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.stderr.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print every generated path, one per line.
    pub(crate) fn file_list(&self, export: &StaticExport) {
        for file in &export.files {
            let _ = self.stdout.write_line(&file.path);
        }
    }

    /// Report a written archive (green).
    pub(crate) fn exported(&self, export: &StaticExport, target: &Path) {
        let msg = format!(
            "Exported {} files to {} ({} bytes)",
            export.files.len(),
            target.display(),
            export.archive.len()
        );
        let _ = self.stderr.write_line(&self.green.apply_to(msg).to_string());
    }
}
