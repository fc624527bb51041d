//! Interactive Viewer Shell
//!
//! A line-oriented front end over the command handlers. Each line is one
//! action; a failing action is reported through the event sink and the
//! session carries on.
//!
//! ```text
//! > load
//! [10:42:07] Loaded preprocessed data
//! > generate 6
//! [10:42:09] Generated: Income vs DALYs
//! > export
//! [10:42:10] Plot saved to assets/income_vs_dalys.png
//! ```

use burden_charts::{ChartKind, FigureRenderer};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

use crate::commands::{
    error_codes, export_chart, generate_chart, load_cached_data, select_chart, upload_data,
};
use crate::events::{AppEventEmitter, EventSink};
use crate::state::AppState;

const HELP: &str = "\
Commands:
  upload <file>         Load, clean and auto-save a raw CSV file
  load                  Load the cleaned data (or the built-in sample)
  list                  Show the chart menu
  select <name|number>  Choose a chart
  generate [name|number]
                        Prepare the selected chart and its statistics
  export [file]         Save the generated chart (.png, .pdf or .svg)
  status                Show the session state
  help                  Show this help
  quit                  Leave the viewer";

/// What the shell should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The viewer session driven by text commands.
pub struct Shell<'a> {
    state: &'a AppState,
    events: &'a dyn EventSink,
    renderer: &'a dyn FigureRenderer,
}

impl<'a> Shell<'a> {
    pub fn new(
        state: &'a AppState,
        events: &'a dyn EventSink,
        renderer: &'a dyn FigureRenderer,
    ) -> Self {
        Self {
            state,
            events,
            renderer,
        }
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        writeln!(output, "Global Disease Burden Analyzer")?;
        writeln!(output, "Type 'help' for commands.")?;
        write!(output, "> ")?;
        output.flush()?;

        for line in input.lines() {
            if self.execute(&line?, &mut output)? == Flow::Quit {
                break;
            }
            write!(output, "> ")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Run a single command line.
    ///
    /// Only failures writing to `output` are returned; action failures have
    /// already been emitted as events.
    pub fn execute<W: Write>(&self, line: &str, output: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, Some(rest.trim()).filter(|s| !s.is_empty())),
            None => (line, None),
        };
        debug!(command, ?argument, "shell command");

        // Action errors are already reported through the event sink.
        match (command.to_lowercase().as_str(), argument) {
            ("", _) => {}
            ("quit" | "exit" | "q", _) => return Ok(Flow::Quit),
            ("help" | "?", _) => writeln!(output, "{HELP}")?,
            ("list" | "charts", _) => write_menu(output)?,
            ("status", _) => {
                let info = self.state.session_info();
                writeln!(output, "Status: {}", info.status)?;
                match &info.source {
                    Some(source) => writeln!(
                        output,
                        "Data: {source} ({} rows, {} columns)",
                        info.rows, info.columns
                    )?,
                    None => writeln!(output, "Data: none")?,
                }
                writeln!(output, "Selected: {}", display_chart(info.selected))?;
                writeln!(output, "Generated: {}", display_chart(info.generated))?;
            }
            ("upload", Some(path)) => {
                let _ = upload_data(self.state, self.events, Path::new(path));
            }
            ("load", _) => {
                let _ = load_cached_data(self.state, self.events);
            }
            ("select", Some(choice)) => {
                let _ = select_chart(self.state, self.events, choice);
            }
            ("generate", choice) => {
                let selected = match choice {
                    Some(choice) => select_chart(self.state, self.events, choice).is_ok(),
                    None => true,
                };
                if selected {
                    let _ = generate_chart(self.state, self.events);
                }
            }
            ("export", path) => {
                let _ = export_chart(self.state, self.events, self.renderer, path.map(Path::new));
            }
            ("upload" | "select", None) => self.events.emit_error(
                error_codes::UNKNOWN_COMMAND,
                &format!("'{command}' needs an argument; type 'help' for usage"),
            ),
            _ => self.events.emit_error(
                error_codes::UNKNOWN_COMMAND,
                &format!("Unknown command '{command}'; type 'help' for usage"),
            ),
        }
        Ok(Flow::Continue)
    }
}

fn write_menu<W: Write>(output: &mut W) -> io::Result<()> {
    for kind in ChartKind::ALL {
        writeln!(output, "{:>2}. {}", kind.number(), kind.name())?;
    }
    Ok(())
}

fn display_chart(kind: Option<ChartKind>) -> &'static str {
    kind.map_or("none", |k| k.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEvents;
    use burden_charts::{ChartResult, Figure};
    use burden_processing::PipelineConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct NullRenderer;

    impl FigureRenderer for NullRenderer {
        fn render(&self, _figure: &Figure, _path: &Path) -> ChartResult<()> {
            Ok(())
        }
    }

    fn state_in(dir: &TempDir) -> AppState {
        AppState::new(
            PipelineConfig::builder()
                .cleaned_data_path(dir.path().join("cleaned.csv"))
                .assets_dir(dir.path().join("assets"))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_session_survives_failed_actions() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let events = RecordingEvents::new();
        let shell = Shell::new(&state, &events, &NullRenderer);

        let script = "generate 1\nfrobnicate\nload\ngenerate 1\nexport\nquit\nstatus\n";
        let mut output = Vec::new();
        shell.run(script.as_bytes(), &mut output).unwrap();

        assert_eq!(events.error_codes(), vec!["NO_DATA_LOADED", "UNKNOWN_COMMAND"]);
        let statuses = events.statuses();
        assert_eq!(statuses.first().map(String::as_str), Some("Selected: DALYs Histogram"));
        assert!(statuses.iter().any(|s| s == "Generated: DALYs Histogram"));
        assert_eq!(
            statuses.last().cloned(),
            Some(format!(
                "Plot saved to {}",
                dir.path().join("assets/dalys_histogram.png").display()
            ))
        );

        // Nothing after `quit` runs.
        let text = String::from_utf8(output).unwrap();
        assert!(!text.contains("Status:"));
    }

    #[test]
    fn test_list_and_status_output() {
        let state = AppState::default();
        let events = RecordingEvents::new();
        let shell = Shell::new(&state, &events, &NullRenderer);

        let mut output = Vec::new();
        shell.execute("list", &mut output).unwrap();
        shell.execute("status", &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with(" 1. DALYs Histogram\n"));
        assert!(text.contains("16. DALYs vs Healthcare Access\n"));
        assert!(text.contains("Status: Ready\nData: none\nSelected: none\nGenerated: none\n"));
    }

    #[test]
    fn test_missing_argument_and_quit() {
        let state = AppState::default();
        let events = RecordingEvents::new();
        let shell = Shell::new(&state, &events, &NullRenderer);
        let mut sink = io::sink();

        assert_eq!(shell.execute("select", &mut sink).unwrap(), Flow::Continue);
        assert_eq!(shell.execute("  QUIT ", &mut sink).unwrap(), Flow::Quit);
        assert_eq!(events.error_codes(), vec!["UNKNOWN_COMMAND"]);
    }
}
