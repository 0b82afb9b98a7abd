//! Linkcheck core: pure control-surface state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, CurrentRow, SessionState, Tally, VerdictKind};
pub use update::update;
pub use view_model::{truncate_display, AppViewModel, DISPLAY_LIMIT};
