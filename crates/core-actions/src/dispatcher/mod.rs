//! Dispatcher applying [`Directive`]s to editor state.
//!
//! Sub-modules:
//! * `edit`           - change / delete
//! * `undo`           - undo / redo folding into a [`HistorySequence`]
//! * `sequence`       - the simulated cursor for an unresolved run
//! * `command_parser` - text to directive
//!
//! Directives are processed one at a time as they are read. An undo or redo
//! opens a pending [`HistorySequence`]; later undo/redo directives extend
//! it, prints materialize the document at its cursor without committing,
//! and the next change, delete or quit (or end of input) resolves it with a
//! single `EditorState::seek`.

use std::io::{BufRead, Write};

use core_config::Config;
use core_state::{EditError, EditorState};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Directive;
use crate::io_ops;

pub mod command_parser;
mod edit;
pub mod sequence;
mod undo;

use command_parser::{DirectiveReader, ParseError};
use sequence::HistorySequence;

pub const DEFAULT_PLACEHOLDER: &str = ".";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to write output")]
    Output(#[source] std::io::Error),
}

impl DispatchError {
    /// Whether processing may continue past this error when malformed
    /// directives are being skipped.
    pub fn is_recoverable(&self) -> bool {
        match self {
            DispatchError::Edit(_) => true,
            DispatchError::Parse(e) => e.is_recoverable(),
            DispatchError::Output(_) => false,
        }
    }
}

/// Result of dispatching a single directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    pub quit: bool,
    /// Lines written to the output.
    pub printed: usize,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self {
            quit: false,
            printed: 0,
        }
    }
    pub fn quit() -> Self {
        Self {
            quit: true,
            printed: 0,
        }
    }
    pub fn printed(lines: usize) -> Self {
        Self {
            quit: false,
            printed: lines,
        }
    }
}

/// Totals for one `Dispatcher::run`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub directives: usize,
    pub skipped: usize,
    pub printed: usize,
    /// True when input ended with an explicit quit.
    pub quit: bool,
}

pub struct Dispatcher {
    state: EditorState,
    sequence: Option<HistorySequence>,
    placeholder: String,
    skip_malformed: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: EditorState::new(),
            sequence: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            skip_malformed: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            placeholder: config.placeholder().to_string(),
            skip_malformed: config.file.input.skip_malformed,
            ..Self::new()
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The unresolved undo/redo run, if any.
    pub fn pending_sequence(&self) -> Option<&HistorySequence> {
        self.sequence.as_ref()
    }

    pub fn dispatch<W: Write>(
        &mut self,
        directive: Directive,
        out: &mut W,
    ) -> Result<DispatchResult, DispatchError> {
        match directive {
            Directive::Change { start, end, lines } => {
                self.resolve_sequence();
                edit::handle_change(&mut self.state, start, end, lines)
            }
            Directive::Delete { start, end } => {
                self.resolve_sequence();
                Ok(edit::handle_delete(&mut self.state, start, end))
            }
            Directive::Print { start, end } => self.print(start, end, out),
            Directive::Undo(n) => Ok(undo::handle_undo(&self.state, &mut self.sequence, n)),
            Directive::Redo(n) => Ok(undo::handle_redo(&self.state, &mut self.sequence, n)),
            Directive::Quit => {
                self.resolve_sequence();
                Ok(DispatchResult::quit())
            }
        }
    }

    /// Resolve any pending run as if a quit had been read.
    pub fn finish(&mut self) {
        self.resolve_sequence();
    }

    /// Read and dispatch directives until quit or end of input.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        reader: &mut DirectiveReader<R>,
        out: &mut W,
    ) -> Result<RunSummary, DispatchError> {
        let mut summary = RunSummary::default();
        loop {
            let step = reader
                .next_directive()
                .map_err(DispatchError::from)
                .and_then(|next| match next {
                    Some(d) => self.dispatch(d, out).map(Some),
                    None => Ok(None),
                });
            match step {
                Ok(Some(result)) => {
                    summary.directives += 1;
                    summary.printed += result.printed;
                    if result.quit {
                        summary.quit = true;
                        break;
                    }
                }
                Ok(None) => {
                    self.finish();
                    break;
                }
                Err(e) if self.skip_malformed && e.is_recoverable() => {
                    summary.skipped += 1;
                    warn!(target: "actions.dispatch", error = %e, line = reader.line_number(), "directive_skipped");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(target: "actions.dispatch", directives = summary.directives, skipped = summary.skipped, printed = summary.printed, quit = summary.quit, "run_complete");
        Ok(summary)
    }

    fn print<W: Write>(
        &mut self,
        start: usize,
        end: usize,
        out: &mut W,
    ) -> Result<DispatchResult, DispatchError> {
        if let Some(seq) = &self.sequence {
            self.state.materialize(seq.cursor());
        }
        let printed = io_ops::write_range(out, self.state.document(), start, end, &self.placeholder)
            .map_err(DispatchError::Output)?;
        Ok(DispatchResult::printed(printed))
    }

    fn resolve_sequence(&mut self) {
        if let Some(seq) = self.sequence.take() {
            debug!(target: "actions.dispatch", origin = seq.origin(), cursor = seq.cursor(), net = seq.net(), steps = seq.steps(), "sequence_resolved");
            self.state.seek(seq.cursor());
        }
    }
}
