use std::io::{IsTerminal, Write};

use clap::Subcommand;
use focus_intervals_core::storage::KvSnapshotStore;
use focus_intervals_core::{
    run_session, Config, Control, Database, Event, FocusSession, SessionView, SystemClock, Update,
    INTERVAL_COUNT,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::player;
use crate::render::{self, StatusReport};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the catch-up state of all intervals as JSON
    Status {
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Start (or resume) an interval
    Start {
        /// Interval number, 1-8. Only the first unfinished interval starts.
        #[arg(value_parser = clap::value_parser!(u8).range(1..=INTERVAL_COUNT as i64))]
        slot: u8,
    },
    /// Pause the running interval
    Stop {
        /// Interval number; defaults to whichever is running
        #[arg(value_parser = clap::value_parser!(u8).range(1..=INTERVAL_COUNT as i64))]
        slot: Option<u8>,
    },
    /// Back to eight untouched intervals
    Reset,
    /// Keep ticking in the foreground, reading commands from stdin
    Run,
}

#[derive(Serialize)]
struct CommandOutput {
    /// Null when the request was ignored.
    event: Option<Event>,
    status: StatusReport,
}

fn open_session(config: &Config) -> Result<FocusSession, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let store = KvSnapshotStore::new(db, config.persistence.store_key.clone());
    let mut session = FocusSession::new(
        Box::new(store),
        config.persistence.throttle(),
        player::from_config(&config.notifications),
        Box::new(SystemClock),
    );
    if let Some(event) = session.hydrate() {
        debug!(?event, "hydrated");
    }
    Ok(session)
}

fn print_json(event: Option<Event>, view: &SessionView) -> Result<(), Box<dyn std::error::Error>> {
    let output = CommandOutput {
        event,
        status: StatusReport::new(view),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn slot_index(slot: u8) -> usize {
    usize::from(slot) - 1
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut session = open_session(&config)?;

    match action {
        TimerAction::Status { table } => {
            let view = session.view();
            if table {
                print!("{}", render::table(&view));
            } else {
                println!("{}", serde_json::to_string_pretty(&StatusReport::new(&view))?);
            }
        }
        TimerAction::Start { slot } => {
            let event = session.start(slot_index(slot));
            if event.is_none() {
                debug!(slot, "start ignored");
            }
            print_json(event, &session.view())?;
        }
        TimerAction::Stop { slot } => {
            let event = match slot {
                Some(slot) => session.stop(slot_index(slot)),
                None => session.stop_running(),
            };
            print_json(event, &session.view())?;
        }
        TimerAction::Reset => {
            let event = session.reset();
            print_json(Some(event), &session.view())?;
        }
        TimerAction::Run => run_foreground(&mut session, &config)?,
    }

    session.shutdown();
    Ok(())
}

const HELP: &str = "commands: start N | stop [N] | reset | status | hide | show | quit";

/// Map one stdin line to a control. `Ok(None)` for blank lines.
fn parse_command(line: &str) -> Result<Option<Control>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let slot = |word: Option<&str>| -> Result<Option<usize>, String> {
        match word {
            None => Ok(None),
            Some(word) => match word.parse::<usize>() {
                Ok(n) if (1..=INTERVAL_COUNT).contains(&n) => Ok(Some(n - 1)),
                _ => Err(format!("interval must be 1-{INTERVAL_COUNT}, got {word:?}")),
            },
        }
    };

    let control = match verb {
        "start" => match slot(words.next())? {
            Some(index) => Control::Start(index),
            None => return Err("usage: start N".to_string()),
        },
        "stop" | "pause" => Control::Stop(slot(words.next())?),
        "reset" => Control::Reset,
        "status" => Control::Refresh,
        "hide" => Control::Hidden,
        "show" => Control::Visible,
        "quit" | "exit" | "q" => Control::Shutdown,
        other => return Err(format!("unknown command {other:?}; {HELP}")),
    };
    Ok(Some(control))
}

async fn read_commands(controls: mpsc::UnboundedSender<Control>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(Some(control)) => {
                    if controls.send(control).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(message) => eprintln!("{message}"),
            },
            // End of input keeps the session ticking until Ctrl-C.
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "stopped reading stdin");
                return;
            }
        }
    }
}

/// Prints events as lines and, on a terminal, keeps a live progress line.
struct Printer {
    live: bool,
    last_line: Option<String>,
}

impl Printer {
    fn new() -> Self {
        Self {
            live: std::io::stdout().is_terminal(),
            last_line: None,
        }
    }

    fn event(&mut self, event: &Event) {
        self.end_live_line();
        println!("{}", render::describe(event));
    }

    fn table(&mut self, view: &SessionView) {
        self.end_live_line();
        print!("{}", render::table(view));
    }

    fn progress(&mut self, view: &SessionView) {
        if !self.live {
            return;
        }
        let line = render::running_line(view);
        if line == self.last_line {
            return;
        }
        match &line {
            Some(text) => print!("\r{text}"),
            None => self.end_live_line(),
        }
        let _ = std::io::stdout().flush();
        self.last_line = line;
    }

    fn end_live_line(&mut self) {
        if self.last_line.take().is_some() {
            println!();
        }
    }

    fn update(&mut self, session: &FocusSession, update: Update<'_>) {
        let view = session.view();
        match update {
            Update::Tick(Some(event)) | Update::Control(_, Some(event)) => self.event(event),
            Update::Control(Control::Refresh, None) => self.table(&view),
            Update::Control(Control::Hidden, None) => {
                self.end_live_line();
                println!("saved; progress keeps counting while hidden");
            }
            Update::Control(_, None) | Update::Tick(None) => {}
        }
        self.progress(&view);
    }
}

fn run_foreground(
    session: &mut FocusSession,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(read_commands(tx.clone()));
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = tx.send(Control::Shutdown);
                }
                Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
            }
        });

        let mut printer = Printer::new();
        printer.table(&session.view());
        eprintln!("{HELP}");
        run_session(session, config.ticker.period(), rx, |session, update| {
            printer.update(session, update)
        })
        .await;
        printer.end_live_line();
    });

    // The stdin reader may be parked in a blocking read.
    runtime.shutdown_background();
    Ok(())
}
