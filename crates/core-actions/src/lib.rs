//! Directive model and dispatch.
//!
//! Input text is turned into [`Directive`] values by
//! [`dispatcher::command_parser::DirectiveReader`]; the [`Dispatcher`] feeds
//! them to `core_state::EditorState`, folding runs of undo/redo into a single
//! history move and writing print output through [`io_ops`].

use core_text::Line;

pub mod dispatcher;
pub mod io_ops;

pub use dispatcher::command_parser::{CommandParser, DirectiveReader, ParseError, ParsedCommand};
pub use dispatcher::sequence::HistorySequence;
pub use dispatcher::{DispatchError, DispatchResult, Dispatcher, RunSummary};

/// One validated editor directive. Ranges are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Overwrite/extend `[start, end]` with `lines` (`end - start + 1` of them).
    Change {
        start: usize,
        end: usize,
        lines: Vec<Line>,
    },
    Delete {
        start: usize,
        end: usize,
    },
    Print {
        start: usize,
        end: usize,
    },
    Undo(usize),
    Redo(usize),
    Quit,
}

impl Directive {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Directive::Change { .. } => "change",
            Directive::Delete { .. } => "delete",
            Directive::Print { .. } => "print",
            Directive::Undo(_) => "undo",
            Directive::Redo(_) => "redo",
            Directive::Quit => "quit",
        }
    }
}
