use linkcheck_core::{update, AppState, Msg, Tally, VerdictKind};
use pretty_assertions::assert_eq;

fn running(total: usize) -> AppState {
    let (state, _) = update(AppState::new(), Msg::RowsLoaded { total });
    update(state, Msg::StartClicked).0
}

fn validated(index: usize, kind: VerdictKind, detail: &str) -> Msg {
    Msg::RowValidated {
        index,
        total: 4,
        row_id: index as u32 + 1,
        display: format!("site{index}.example"),
        kind,
        detail: detail.to_string(),
    }
}

#[test]
fn row_started_shows_a_progress_line() {
    let (state, _) = update(
        running(4),
        Msg::RowStarted {
            index: 1,
            total: 4,
            row_id: 2,
            display: "example.com".to_string(),
        },
    );
    let view = state.view();
    assert_eq!(view.current_line.as_deref(), Some("[1/4] row 2: example.com"));
    assert_eq!(view.percent, 0);
}

#[test]
fn long_cells_are_truncated_in_the_progress_line() {
    let display = format!("https://{}.example", "a".repeat(100));
    let (state, _) = update(
        running(4),
        Msg::RowStarted {
            index: 1,
            total: 4,
            row_id: 2,
            display,
        },
    );
    let line = state.view().current_line.unwrap();
    assert!(line.ends_with("..."));
    assert_eq!(line.chars().count(), "[1/4] row 2: ".len() + 60);
}

#[test]
fn validated_rows_feed_the_tally() {
    let mut state = running(4);
    for msg in [
        validated(1, VerdictKind::Valid, "OK - HTTP 200"),
        validated(2, VerdictKind::Invalid, "HTTP 404"),
        validated(3, VerdictKind::Review, "no SSL certificate (HTTP)"),
        validated(4, VerdictKind::Skipped, "empty cell"),
    ] {
        state = update(state, msg).0;
    }

    let view = state.view();
    assert_eq!(
        view.tally,
        Tally {
            valid: 1,
            invalid: 1,
            review: 1,
            skipped: 1,
        }
    );
    assert_eq!(view.processed, 4);
    assert_eq!(view.percent, 100);
    assert_eq!(view.last_detail.as_deref(), Some("empty cell"));
    assert_eq!(view.current_line, None);
}

#[test]
fn retries_are_counted() {
    let (state, _) = update(
        running(4),
        Msg::RetryScheduled {
            url: "https://slow.example".to_string(),
            attempt: 1,
        },
    );
    assert_eq!(state.view().retries, 1);
}

#[test]
fn progress_before_start_is_ignored() {
    let (state, _) = update(AppState::new(), validated(1, VerdictKind::Valid, "OK"));
    assert_eq!(state.tally(), Tally::default());
}

#[test]
fn dirty_flag_is_consumed_once() {
    let (mut state, _) = update(running(4), validated(1, VerdictKind::Valid, "OK"));
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());

    let (mut state, _) = update(state, Msg::Tick);
    assert!(!state.consume_dirty());
}
