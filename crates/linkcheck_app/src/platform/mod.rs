mod app;
mod console;
mod effects;
mod logging;
mod render;
mod report;
mod settings;
mod sheet;

pub use app::run_app;
