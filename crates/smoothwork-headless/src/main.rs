mod cli;
mod config;
mod constants;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use smoothwork_engine::{
    Editor, EditorEvent, EngineError, EventError, EventSink, FileStore, SimulationError,
};
use smoothwork_nodes::MockSimulator;
use thiserror::Error;

use cli::Cli;

#[derive(Debug, Error)]
enum HeadlessError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to read workflow: {0}")]
    Io(#[from] std::io::Error),
}

/// Forwards editor events to the log
struct LogEventSink;

impl EventSink for LogEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        log::debug!("{:?}", event);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(options: Cli) -> Result<ExitCode, HeadlessError> {
    let data_dir = options.data_dir;
    let editor_config = config::load_editor_config(&data_dir);
    let store = FileStore::new(&data_dir, editor_config.storage_key.clone());
    log::info!("Smoothwork starting with data dir {:?}", data_dir);

    let mut editor = Editor::new(editor_config, Arc::new(store)).with_event_sink(Arc::new(LogEventSink));
    editor.hydrate();

    if let Some(path) = &options.workflow {
        let text = std::fs::read_to_string(path)?;
        editor.import_json(&text)?;
        log::info!("Imported {:?}", path);
    }

    if options.layout && editor.auto_layout() {
        log::info!("Applied auto-layout");
    }

    let code = match editor.start_simulation() {
        Ok(pending) => match pending.run(&MockSimulator::new()).await {
            Ok(trace) => {
                for step in trace {
                    println!("{:>3}. [{}] {}", step.step, step.node_type, step.message);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Err(SimulationError::Preflight(issues)) => {
            for issue in issues {
                eprintln!("- {}", issue);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    };

    if let Some(dir) = &options.export_dir {
        let path = editor.export_to(dir)?;
        println!("Exported {}", path.display());
    }

    Ok(code)
}
