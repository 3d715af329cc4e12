//! Textual directive parsing.
//!
//! One directive per input line, the command letter last:
//!
//! ```text
//! 1,3c      followed by 3 payload lines and a "." line
//! 2,4d
//! 1,9p
//! 3u
//! 1r
//! q
//! ```
//!
//! `CommandParser` classifies a single command line. `DirectiveReader` pulls
//! lines from a `BufRead`, reads change payloads, and yields complete
//! [`Directive`]s. Payload lines are opaque: only the line terminator
//! (`\n` or `\r\n`) is stripped, so a payload line may itself be `.`.

use std::io::BufRead;

use thiserror::Error;
use tracing::trace;

use crate::Directive;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unknown command {found:?}")]
    UnknownCommand { line: usize, found: String },
    #[error("line {line}: invalid number {found:?}")]
    InvalidNumber { line: usize, found: String },
    #[error("line {line}: '{command}' requires a range like 1,2{command}")]
    MissingRange { line: usize, command: char },
    #[error("line {line}: invalid change range {start},{end}")]
    InvalidChangeRange { line: usize, start: usize, end: usize },
    #[error("line {line}: input ended after {got} of {expected} payload lines")]
    TruncatedPayload {
        line: usize,
        expected: usize,
        got: usize,
    },
    #[error("line {line}: expected \".\" after change payload, found {found:?}")]
    MissingTerminator { line: usize, found: String },
    #[error("failed to read input line {line}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Input line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnknownCommand { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::MissingRange { line, .. }
            | ParseError::InvalidChangeRange { line, .. }
            | ParseError::TruncatedPayload { line, .. }
            | ParseError::MissingTerminator { line, .. }
            | ParseError::Io { line, .. } => *line,
        }
    }

    /// Syntax problems can be skipped; read failures cannot.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ParseError::Io { .. })
    }
}

/// A classified command line. `Change` still needs its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedCommand {
    Change { start: usize, end: usize },
    Delete { start: usize, end: usize },
    Print { start: usize, end: usize },
    Undo(usize),
    Redo(usize),
    Quit,
}

pub struct CommandParser;

impl CommandParser {
    pub fn parse(raw: &str, line: usize) -> Result<ParsedCommand, ParseError> {
        let s = raw.trim();
        let unknown = || ParseError::UnknownCommand {
            line,
            found: s.to_string(),
        };
        let Some(letter) = s.chars().last() else {
            return Err(unknown());
        };
        let body = s[..s.len() - letter.len_utf8()].trim_end();
        match letter {
            'q' if body.is_empty() => Ok(ParsedCommand::Quit),
            'u' => Ok(ParsedCommand::Undo(parse_number(body, line)?)),
            'r' => Ok(ParsedCommand::Redo(parse_number(body, line)?)),
            'c' | 'd' | 'p' => {
                let (a, b) = body.split_once(',').ok_or(ParseError::MissingRange {
                    line,
                    command: letter,
                })?;
                let start = parse_number(a, line)?;
                let end = parse_number(b, line)?;
                match letter {
                    'c' if start == 0 || end < start => {
                        Err(ParseError::InvalidChangeRange { line, start, end })
                    }
                    'c' => Ok(ParsedCommand::Change { start, end }),
                    'd' => Ok(ParsedCommand::Delete { start, end }),
                    _ => Ok(ParsedCommand::Print { start, end }),
                }
            }
            _ => Err(unknown()),
        }
    }
}

fn parse_number(text: &str, line: usize) -> Result<usize, ParseError> {
    let t = text.trim();
    t.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        found: t.to_string(),
    })
}

/// Upper bound on payload lines reserved before any are read.
const PAYLOAD_RESERVE: usize = 1024;

fn strip_terminator(raw: &str) -> &str {
    let s = raw.strip_suffix('\n').unwrap_or(raw);
    s.strip_suffix('\r').unwrap_or(s)
}

/// Streaming reader producing directives from line-oriented text.
pub struct DirectiveReader<R> {
    input: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> DirectiveReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Number of input lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    fn next_line(&mut self) -> Result<Option<(usize, &str)>, ParseError> {
        self.buf.clear();
        let read = self
            .input
            .read_line(&mut self.buf)
            .map_err(|source| ParseError::Io {
                line: self.line_no + 1,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some((self.line_no, strip_terminator(&self.buf))))
    }

    /// Next directive, or `None` at end of input. Blank lines between
    /// directives are skipped.
    pub fn next_directive(&mut self) -> Result<Option<Directive>, ParseError> {
        let parsed = loop {
            match self.next_line()? {
                None => return Ok(None),
                Some((_, raw)) if raw.trim().is_empty() => continue,
                Some((line, raw)) => break CommandParser::parse(raw, line)?,
            }
        };
        let directive = match parsed {
            ParsedCommand::Change { start, end } => Directive::Change {
                start,
                end,
                lines: self.read_payload(end - start + 1)?,
            },
            ParsedCommand::Delete { start, end } => Directive::Delete { start, end },
            ParsedCommand::Print { start, end } => Directive::Print { start, end },
            ParsedCommand::Undo(n) => Directive::Undo(n),
            ParsedCommand::Redo(n) => Directive::Redo(n),
            ParsedCommand::Quit => Directive::Quit,
        };
        trace!(target: "actions.parse", line = self.line_no, kind = directive.kind_str(), "directive");
        Ok(Some(directive))
    }

    fn read_payload(&mut self, expected: usize) -> Result<Vec<core_text::Line>, ParseError> {
        let mut lines = Vec::with_capacity(expected.min(PAYLOAD_RESERVE));
        while lines.len() < expected {
            match self.next_line()? {
                Some((_, text)) => lines.push(core_text::line(text)),
                None => {
                    return Err(ParseError::TruncatedPayload {
                        line: self.line_no,
                        expected,
                        got: lines.len(),
                    });
                }
            }
        }
        match self.next_line()? {
            Some((_, t)) if t.trim() == "." => Ok(lines),
            Some((line, t)) => Err(ParseError::MissingTerminator {
                line,
                found: t.to_string(),
            }),
            None => Err(ParseError::MissingTerminator {
                line: self.line_no,
                found: String::new(),
            }),
        }
    }
}

impl<R: BufRead> Iterator for DirectiveReader<R> {
    type Item = Result<Directive, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_directive().transpose()
    }
}
