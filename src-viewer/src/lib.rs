//! Global Disease Burden Analyzer - application layer
//!
//! Wires the analysis core and the chart catalogue into two front ends:
//! a batch run and an interactive viewer.
//!
//! # Architecture Overview
//!
//! ```text
//! -------------------------------------------------------------------
//! |                        burden-analyzer                          |
//! |                                                                 |
//! |  ---------------  ---------------  ---------------------------  |
//! |  |    batch    |  |    State    |  |    Command Handlers     |  |
//! |  |  pipeline + |  |  AppState   |  |  - upload_data          |  |
//! |  |  catalogue  |  |  (RwLocks)  |  |  - load_cached_data     |  |
//! |  ---------------  ---------------  |  - select_chart         |  |
//! |                                    |  - generate_chart       |  |
//! |                                    |  - export_chart         |  |
//! |                                    ---------------------------  |
//! |                                                                 |
//! |  -----------------------------------------------------------    |
//! |  |                 Events (handlers → display)             |    |
//! |  |  data:loaded, chart:generated, chart:exported,          |    |
//! |  |  app:status, app:error, analysis:progress               |    |
//! |  -----------------------------------------------------------    |
//! |                                                                 |
//! |  -----------------------------------------------------------    |
//! |  |                 Shell (line commands)                   |    |
//! |  -----------------------------------------------------------    |
//! -------------------------------------------------------------------
//! ```

pub mod batch;
pub mod commands;
pub mod events;
pub mod shell;
pub mod state;

pub use batch::{BatchOutcome, run_batch, saved_locations};
pub use commands::ViewerError;
pub use events::{AppEventEmitter, EventSink, RecordingEvents, TerminalEvents};
pub use shell::{Flow, Shell};
pub use state::AppState;

use burden_charts::PlottersRenderer;
use burden_processing::PipelineConfig;
use std::io;

/// Open the interactive viewer on stdin/stdout.
pub fn run_viewer(config: PipelineConfig) -> io::Result<()> {
    let state = AppState::new(config);
    let events = TerminalEvents;
    let renderer = PlottersRenderer::default();

    let stdin = io::stdin();
    Shell::new(&state, &events, &renderer).run(stdin.lock(), io::stdout())
}
