use crate::{SessionState, Tally};

/// Longest cell text shown in a progress line.
pub const DISPLAY_LIMIT: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub total_rows: usize,
    pub processed: usize,
    pub percent: u8,
    pub tally: Tally,
    /// `[index/total] row N: text` for the row in flight.
    pub current_line: Option<String>,
    pub last_detail: Option<String>,
    pub retries: usize,
    pub error: Option<String>,
    pub dirty: bool,
}

/// Cut `text` to `limit` characters, marking the cut with `...`.
pub fn truncate_display(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_display("example.com", DISPLAY_LIMIT), "example.com");
    }

    #[test]
    fn long_text_is_cut_to_the_limit() {
        let long = "ñ".repeat(80);
        let cut = truncate_display(&long, DISPLAY_LIMIT);
        assert_eq!(cut.chars().count(), DISPLAY_LIMIT);
        assert!(cut.ends_with("..."));
    }
}
