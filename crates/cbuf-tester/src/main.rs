mod command;
mod session;

use std::{path::PathBuf, process::ExitCode};

use cbuf_common::__log::{LevelFilter, error, info};
use cbuf_core::{BufferMode, DefaultPoolConfig, PoolConfig};
use clap::{Parser, ValueEnum};
use rustyline::{DefaultEditor, error::ReadlineError};

use crate::command::parse;
use crate::session::{Reply, Session};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Fifo,
    Ring,
}

impl From<ModeArg> for BufferMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Fifo => BufferMode::Fifo,
            ModeArg::Ring => BufferMode::Ring,
        }
    }
}

/// Drives a pool of circular buffers from the command line.
#[derive(Parser, Debug)]
struct Args {
    /// Element capacity of every buffer bound by `init` / `claim-init`.
    #[arg(long, default_value_t = DefaultPoolConfig::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Fill policy applied to freshly initialised buffers.
    #[arg(long, value_enum, default_value_t = ModeArg::Fifo)]
    mode: ModeArg,

    /// Run the commands in this file instead of starting a prompt.
    #[arg(long)]
    script: Option<PathBuf>,
}

/// Runs one line and prints its reply. Returns `false` once the session
/// should end.
fn run_line(session: &mut Session, line: &str) -> bool {
    let cmd = match parse(line) {
        Ok(Some(cmd)) => cmd,
        Ok(None) => return true,
        Err(e) => {
            println!("error: {}", e);
            return true;
        }
    };

    match session.execute(cmd) {
        Reply::Text(text) => {
            println!("{}", text);
            true
        }
        Reply::Quit => false,
    }
}

fn run_script(session: &mut Session, path: &PathBuf) -> ExitCode {
    let script = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            error!("Cannot read script {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    for line in script.lines() {
        println!("> {}", line);
        if !run_line(session, line) {
            break;
        }
    }
    ExitCode::SUCCESS
}

fn run_prompt(session: &mut Session) -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            error!("Cannot start prompt: {}", e);
            return ExitCode::FAILURE;
        }
    };

    loop {
        match editor.readline("cbuf> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                if !run_line(session, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                error!("Prompt failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if args.capacity == 0 {
        error!("Capacity must be greater than zero");
        return ExitCode::FAILURE;
    }

    let mut session = Session::new(args.capacity, args.mode.into());
    info!("Type `help` for the list of commands");

    match &args.script {
        Some(path) => run_script(&mut session, path),
        None => run_prompt(&mut session),
    }
}
