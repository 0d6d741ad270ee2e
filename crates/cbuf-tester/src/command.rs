use std::fmt;

use cbuf_core::BufferMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Claim,
    Init(usize),
    ClaimInit,
    Return(usize),
    Add(usize, i32),
    Read(usize),
    Mode(usize, Option<BufferMode>),
    Fill(usize, i32, i32),
    Dump(usize),
    Stats,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidNumber(String),
    InvalidMode(String),
    TrailingInput(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand(c) => write!(f, "unknown command `{}` (try `help`)", c),
            ParseError::MissingArgument(name) => write!(f, "missing argument <{}>", name),
            ParseError::InvalidNumber(s) => write!(f, "`{}` is not a valid number", s),
            ParseError::InvalidMode(s) => write!(f, "`{}` is not a mode, expected fifo or ring", s),
            ParseError::TrailingInput(s) => write!(f, "unexpected input `{}`", s),
        }
    }
}

pub const HELP: &str = "\
claim                 claim a free slot
init <slot>           bind fresh storage to a claimed slot
claim-init            claim a slot and bind fresh storage to it
return <slot>         give a slot back to the pool
add <slot> <value>    append a value
read <slot>           take the oldest value
mode <slot> [fifo|ring]
                      show or change the fill policy
fill <slot> <from> <to>
                      append every value in from..=to
dump <slot>           show the buffer state and storage
stats                 show pool counters
reset                 re-arm the pool
help                  show this text
quit                  leave";

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.split('#').next().unwrap_or("");
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let cmd = match name {
        "claim" => Command::Claim,
        "init" => Command::Init(number(words.next(), "slot")?),
        "claim-init" => Command::ClaimInit,
        "return" => Command::Return(number(words.next(), "slot")?),
        "add" => Command::Add(number(words.next(), "slot")?, number(words.next(), "value")?),
        "read" => Command::Read(number(words.next(), "slot")?),
        "mode" => {
            let slot = number(words.next(), "slot")?;
            let mode = words.next().map(parse_mode).transpose()?;
            Command::Mode(slot, mode)
        }
        "fill" => Command::Fill(
            number(words.next(), "slot")?,
            number(words.next(), "from")?,
            number(words.next(), "to")?,
        ),
        "dump" => Command::Dump(number(words.next(), "slot")?),
        "stats" => Command::Stats,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    match words.next() {
        Some(extra) => Err(ParseError::TrailingInput(extra.to_string())),
        None => Ok(Some(cmd)),
    }
}

fn number<N: std::str::FromStr>(word: Option<&str>, name: &'static str) -> Result<N, ParseError> {
    let word = word.ok_or(ParseError::MissingArgument(name))?;
    word.parse()
        .map_err(|_| ParseError::InvalidNumber(word.to_string()))
}

fn parse_mode(word: &str) -> Result<BufferMode, ParseError> {
    match word.to_ascii_lowercase().as_str() {
        "fifo" => Ok(BufferMode::Fifo),
        "ring" => Ok(BufferMode::Ring),
        _ => Err(ParseError::InvalidMode(word.to_string())),
    }
}
