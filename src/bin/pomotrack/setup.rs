use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pomotrack::domain::app::ApplicationCore;
use pomotrack::domain::repository::{RecordRepository, TaskRepository};
use pomotrack::terminal::config::{self, Configuration};
use pomotrack::terminal::repository::{DurationConfiguration, SqliteStorage};
use pomotrack::terminal::view::StdoutScreen;
use pomotrack::terminal::Terminal;
use pomotrack::utils::xdg::{Xdg, XdgBaseKind};
use snafu::{prelude::*, Whatever};

use crate::cli::Arguments;

const APP_NAME: &str = "pomotrack";

pub async fn bootstrap(args: &Arguments) -> Result<Terminal, Whatever> {
    logger(args)?;
    let configuration = configuration(args)?;
    let storage = storage(args, &configuration)?;

    let records: Arc<dyn RecordRepository> = storage.clone();
    let tasks: Arc<dyn TaskRepository> = storage;
    let duration_repository = Arc::new(DurationConfiguration::new(configuration));

    let (core, events) = ApplicationCore::setup(duration_repository, records, tasks)
        .await
        .whatever_context("Could not setup application core")?;

    Ok(Terminal::new(core, events, Arc::new(StdoutScreen)))
}

fn xdg_data(file: &str) -> Result<PathBuf, Whatever> {
    Xdg::new(APP_NAME)
        .and_then(|xdg| xdg.resolve_create(XdgBaseKind::Data, file))
        .whatever_context("Could not use XDG base directories")
}

fn logger(args: &Arguments) -> Result<(), Whatever> {
    let path = match &args.log_file {
        Some(path) => path.clone(),
        None => xdg_data("pomotrack.log")?,
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .whatever_context(format!("Could not open log file {}", path.display()))?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(args.verbosity)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .whatever_context("Could not setup logger")?;
    Ok(())
}

fn configuration(args: &Arguments) -> Result<Arc<Configuration>, Whatever> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => config::xdg_path(APP_NAME)
            .whatever_context("Could not resolve configuration file")?,
    };

    let mut configuration =
        config::load(&path, true).whatever_context("Could not load configuration")?;

    if configuration.apply(args.overrides()) {
        config::save(&path, &configuration)
            .whatever_context("Could not save configuration")?;
        tracing::info!(path = %path.display(), "Saved timer settings from command line");
    }

    Ok(Arc::new(configuration))
}

fn storage(args: &Arguments, configuration: &Configuration) -> Result<Arc<SqliteStorage>, Whatever> {
    let path = match args.database.as_ref().or(configuration.storage.database.as_ref()) {
        Some(path) => path.clone(),
        None => xdg_data("database.db")?,
    };

    let storage = SqliteStorage::open(&path)
        .whatever_context(format!("Could not open database {}", path.display()))?;

    Ok(Arc::new(storage))
}
