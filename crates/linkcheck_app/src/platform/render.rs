use std::io::{self, Write};

use linkcheck_core::AppViewModel;

/// One status line for the terminal.
pub fn status_line(view: &AppViewModel) -> String {
    let mut line = format!(
        "[{}] {}/{} ({}%) | valid {} | invalid {} | review {} | skipped {}",
        view.session.label(),
        view.processed,
        view.total_rows,
        view.percent,
        view.tally.valid,
        view.tally.invalid,
        view.tally.review,
        view.tally.skipped,
    );
    if view.retries > 0 {
        line.push_str(&format!(" | retries {}", view.retries));
    }
    if let Some(current) = &view.current_line {
        line.push_str(" | ");
        line.push_str(current);
    }
    line
}

/// Redraw the status line in place on stderr.
pub fn render(view: &AppViewModel) {
    let mut stderr = io::stderr().lock();
    let _ = write!(stderr, "\r\x1b[2K{}", status_line(view));
    let _ = stderr.flush();
}

/// Leave the status line and move to a fresh line.
pub fn finish_line() {
    eprintln!();
}
