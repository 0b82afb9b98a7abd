use crate::{AppState, CurrentRow, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RowsLoaded { total } => {
            if state.session() == SessionState::Idle {
                state.set_total_rows(total);
            }
            Vec::new()
        }
        Msg::StartClicked => {
            if state.session() == SessionState::Idle && state.total_rows() > 0 {
                state.transition(SessionState::Running);
                vec![Effect::StartBatch]
            } else {
                Vec::new()
            }
        }
        Msg::PauseToggled => match state.session() {
            SessionState::Running => {
                state.transition(SessionState::Paused);
                vec![Effect::PauseBatch]
            }
            SessionState::Paused => {
                state.transition(SessionState::Running);
                vec![Effect::ResumeBatch]
            }
            _ => Vec::new(),
        },
        Msg::StopClicked => {
            if matches!(
                state.session(),
                SessionState::Running | SessionState::Paused
            ) {
                state.transition(SessionState::Stopping);
                vec![Effect::StopBatch]
            } else {
                Vec::new()
            }
        }
        Msg::RowStarted {
            index,
            total,
            row_id,
            display,
        } => {
            if state.session().is_active() {
                state.begin_row(CurrentRow {
                    index,
                    total,
                    row_id,
                    display,
                });
            }
            Vec::new()
        }
        Msg::RetryScheduled { .. } => {
            if state.session().is_active() {
                state.note_retry();
            }
            Vec::new()
        }
        Msg::RowValidated {
            index, kind, detail, ..
        } => {
            if state.session().is_active() {
                state.finish_row(index, kind, detail);
            }
            Vec::new()
        }
        Msg::BatchStopped { .. } => {
            if state.session().is_active() {
                state.end(SessionState::Cancelled, None);
            }
            Vec::new()
        }
        Msg::BatchCompleted => match state.session() {
            SessionState::Running | SessionState::Paused => {
                state.end(SessionState::Finished, None);
                vec![Effect::PersistResults]
            }
            // The stop arrived after the last row; the user's stop still wins.
            SessionState::Stopping => {
                state.end(SessionState::Cancelled, None);
                Vec::new()
            }
            _ => Vec::new(),
        },
        Msg::BatchFailed { message } => {
            if state.session().is_active() {
                state.end(SessionState::Finished, Some(message));
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
