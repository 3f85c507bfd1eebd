//! Terminal front-end.
//!
//! Thin UI adapter: reads operator commands line by line, forwards them
//! into the capture session and prints the outcome. Rendering-heavy
//! front-ends plug into the same session API.

use std::io::{self, BufRead, Write};

use crate::module::session::{CaptureSession, Phase};
use crate::module::util::conf;

/// Operator command, one per input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Label(String),
    Clear,
    Snap,
    Burst {
        /// Falls back to the configured default when omitted.
        interval_ms: Option<u64>,
        max_count: Option<u64>,
    },
    Stop,
    Status,
    Quit,
}

/// Parses one input line. Returns `None` for blank or malformed input.
/// Label text is passed through untouched so the session can report
/// invalid labels itself.
pub fn parse(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "label" => Some(Command::Label(parts.collect::<Vec<_>>().join(" "))),
        "clear" => Some(Command::Clear),
        "snap" => Some(Command::Snap),
        "burst" => {
            let interval_ms = match parts.next() {
                Some(arg) => Some(arg.parse().ok()?),
                None => None,
            };
            let max_count = match parts.next() {
                Some(arg) => Some(arg.parse().ok()?),
                None => None,
            };
            Some(Command::Burst {
                interval_ms,
                max_count,
            })
        }
        "stop" => Some(Command::Stop),
        "status" => Some(Command::Status),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

const USAGE: &str =
    "commands: label <name> | clear | snap | burst [interval_ms] [count] | stop | status | quit";

/// Runs the command loop until `quit` or end of input.
///
/// # Arguments
///
/// * `session` - The capture session to drive.
/// * `defaults` - Configured burst defaults for a bare `burst` command.
///
pub fn run(session: &CaptureSession, defaults: &conf::Burst) {
    println!("{}", USAGE);
    prompt();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        match parse(&line) {
            Some(Command::Label(raw)) => match session.select_label(&raw) {
                Ok(count) => println!("label set, {} records on disk", count),
                Err(e) => println!("error: {}", e),
            },
            Some(Command::Clear) => {
                session.deselect_label();
                println!("label cleared");
            }
            Some(Command::Snap) => match session.capture_one() {
                Ok((record, count)) => {
                    println!("saved {} ({} total)", record.path.display(), count)
                }
                Err(e) => println!("error: {}", e),
            },
            Some(Command::Burst {
                interval_ms,
                max_count,
            }) => {
                let interval_ms = interval_ms.unwrap_or(defaults.interval_ms);
                let max_count = max_count.unwrap_or(defaults.max_count);
                match session.start_burst(interval_ms, max_count) {
                    Ok(true) => println!("burst running, 'stop' to end it"),
                    Ok(false) => println!("burst already running, 'stop' it first"),
                    Err(e) => println!("error: {}", e),
                }
            }
            Some(Command::Stop) => {
                session.stop_burst();
                println!("burst stopped");
            }
            Some(Command::Status) => print_status(session),
            Some(Command::Quit) => break,
            None => println!("{}", USAGE),
        }
        prompt();
    }
    // End of session: make sure no burst thread outlives the operator.
    session.stop_burst();
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn print_status(session: &CaptureSession) {
    let snap = session.snapshot();
    let phase = match snap.phase {
        Phase::Idle => "idle",
        Phase::Ready => "ready",
        Phase::Capturing => "capturing",
    };
    println!("phase: {}", phase);
    println!("label: {}", snap.label.as_deref().unwrap_or("-"));
    println!("count: {}", snap.count);
    if let Some(record) = &snap.last_record {
        println!("last:  {}", record.path.display());
    }
    if let Some(err) = &snap.last_error {
        println!("error: {}", err);
    }
    match session.preview() {
        Ok(frame) => println!("preview: {}x{}", frame.width(), frame.height()),
        Err(e) => println!("preview: {}", e),
    }
}
