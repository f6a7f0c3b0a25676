mod analysis;
mod check;
mod cli;
mod code_panel;
mod config;
mod controller;
mod diagnostics;
mod diagnostics_panel;
mod editor;
mod engine;
mod logging;
mod states;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::cli::{Cli, Command, LogLevelArg};
use crate::config::PlaygroundConfig;
use crate::engine::CommandEngine;
use crate::states::storage::{AnyStore, FileStore, MemoryStore};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let explicit_level = cli.log_level.map(|level| match level {
        LogLevelArg::Error => LevelFilter::ERROR,
        LogLevelArg::Warn => LevelFilter::WARN,
        LogLevelArg::Info => LevelFilter::INFO,
        LogLevelArg::Debug => LevelFilter::DEBUG,
        LogLevelArg::Trace => LevelFilter::TRACE,
    });
    let level = explicit_level.unwrap_or_else(|| cli.verbosity.tracing_level_filter());
    logging::init_logging(level, explicit_level.is_none() && !cli.verbosity.is_present());

    let config_path = cli.config.clone().unwrap_or_else(PlaygroundConfig::default_path);
    let config = match PlaygroundConfig::load_from(&config_path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "falling back to default configuration");
            PlaygroundConfig::default()
        }
    };

    let engine = build_engine(&cli, &config)?;

    match &cli.command {
        Some(Command::Check(args)) => {
            let code = check::run(engine, args)?;
            std::process::exit(code)
        }
        Some(Command::Gui) | None => run_gui(engine, build_store(&cli, &config)),
    }
}

fn build_engine(cli: &Cli, config: &PlaygroundConfig) -> Result<CommandEngine> {
    let (program, args) = config
        .engine
        .resolve(cli.engine.as_deref(), &cli.engine_args)?;
    let engine = CommandEngine::new(program, args);
    tracing::debug!(program = %engine.program().display(), "engine configured");
    Ok(engine)
}

fn build_store(cli: &Cli, config: &PlaygroundConfig) -> AnyStore {
    if cli.ephemeral {
        tracing::info!("ephemeral session, settings are not persisted");
        return AnyStore::Memory(MemoryStore::new());
    }
    let path = cli
        .storage
        .clone()
        .or_else(|| config.storage.path.clone())
        .unwrap_or_else(FileStore::default_path);
    let store = FileStore::open(path);
    tracing::info!(path = %store.path().display(), "using settings store");
    AnyStore::File(store)
}

fn run_gui(engine: CommandEngine, store: AnyStore) -> Result<()> {
    let native_options = eframe::NativeOptions::default();
    let app = ui::create_app(engine, store);
    eframe::run_native(
        "PEG Playground",
        native_options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|err| anyhow::anyhow!("failed to start the window: {err}"))
}
