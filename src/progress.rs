// Progress bar over the input dump, measured in bytes consumed.
// Disabled in debug/quiet mode so log lines are not mangled by redraws.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy)]
pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    // One bar sized to the file; None when progress is off.
    pub fn new_file_bar(&self, path: &Path, label: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let bar = ProgressBar::new(size);
        if let Ok(style) = progress_style() {
            bar.set_style(style);
        }
        bar.set_prefix(label.to_string());
        Some(bar)
    }
}

fn progress_style() -> Result<ProgressStyle, indicatif::style::TemplateError> {
    Ok(ProgressStyle::with_template(
        "{prefix:20} {bytes:>10}/{total_bytes:<10} [{bar:50}] {percent:>3}% {msg}",
    )?
    .progress_chars("█ "))
}
