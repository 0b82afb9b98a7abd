use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use engine_logging::{engine_error, engine_info};
use linkcheck_core::{update, AppState, Msg, SessionState};
use linkcheck_engine::{BatchRunner, ValidationEngine};

use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::report;
use super::settings::AppSettings;
use super::sheet::{column_index, Sheet};
use super::{console, render};
use crate::cli::Cli;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let settings = AppSettings::resolve(&cli)?;
    logging::initialize(
        LogDestination::for_run(cli.quiet),
        engine_logging::run_level(cli.verbose),
        &settings.log_file,
    );

    let result = run_batch(&cli, &settings);
    if let Err(err) = &result {
        engine_error!("{:#}", err);
    }
    result
}

fn run_batch(cli: &Cli, settings: &AppSettings) -> anyhow::Result<()> {
    settings.validate()?;
    let url_column = column_index(&settings.column)?;
    let status_column = column_index(&settings.status_column)?;

    let mut sheet = Sheet::load(&cli.input)?;
    let requests = sheet.requests(url_column, settings.start_row, settings.end_row);
    if requests.is_empty() {
        bail!(
            "no rows in range {}..={} of {} (column {})",
            settings.start_row,
            settings.end_row,
            cli.input.display(),
            settings.column
        );
    }

    let config = settings.engine_config()?;
    engine_info!(
        "Checking {:?} column {} rows {}..={}: {} rows, delay {:?}, status column {}",
        cli.input,
        settings.column,
        settings.start_row,
        settings.end_row,
        requests.len(),
        config.request_delay,
        settings.status_column
    );
    let engine = ValidationEngine::from_config(&config).context("building HTTP client")?;
    let runner = BatchRunner::new(engine, &config);
    let total = requests.len();

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let mut effects = EffectRunner::new(runner, requests, msg_tx.clone());
    console::spawn_command_reader(msg_tx);
    if !cli.quiet {
        eprintln!("Commands: p + Enter pauses/resumes, s + Enter stops without saving.");
    }

    let started = Instant::now();
    let mut state = AppState::new();
    for msg in [Msg::RowsLoaded { total }, Msg::StartClicked] {
        state = dispatch(state, msg, &mut effects);
    }

    loop {
        let msg = match msg_rx.recv_timeout(TICK_INTERVAL) {
            Ok(msg) => msg,
            Err(RecvTimeoutError::Timeout) => Msg::Tick,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        state = dispatch(state, msg, &mut effects);
        if state.consume_dirty() && !cli.quiet {
            render::render(&state.view());
        }
        if matches!(
            state.session(),
            SessionState::Finished | SessionState::Cancelled
        ) {
            break;
        }
    }
    if !cli.quiet {
        render::finish_line();
    }

    let outcome = match effects.finish() {
        Some(result) => result.context("validation batch failed")?,
        None => bail!("validation batch never started"),
    };
    let elapsed = started.elapsed();
    report::log_summary(&outcome, elapsed);

    if let Some(path) = &cli.report {
        let json = report::build_report(&cli.input, settings, &outcome, elapsed);
        report::write_report(path, &json)?;
    }

    if effects.persist_requested() && state.session() == SessionState::Finished {
        let written = match outcome.write_back(&mut sheet.writer(status_column)) {
            Ok(written) => written,
            Err(never) => match never {},
        };
        let output = cli.output.as_deref().unwrap_or(&cli.input);
        sheet.save_atomic(output)?;
        engine_info!(
            "Wrote {} results to column {} of {:?}",
            written,
            settings.status_column,
            output
        );
    } else {
        engine_info!("Run was stopped; {:?} left unchanged", cli.input);
    }
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, effects: &mut EffectRunner) -> AppState {
    let (state, requested) = update(state, msg);
    effects.enqueue(requested);
    state
}
