//! Command log and document reconstruction.
//!
//! Every committed mutation is appended as a [`Command`]. Deletes checkpoint
//! the whole document (a clone of the reference vector, never the text);
//! changes keep only the lines they wrote. The document at any cursor is
//! rebuilt from the nearest delete at or before it plus forward replay of
//! the changes that follow, so reconstruction cost depends on the distance
//! to that checkpoint rather than on total history length.
//!
//! Log indices exposed by this module are 1-based (`entry(1)` is the first
//! command) to match `last_delete`, where 0 means "no delete yet".

use core_text::{Document, Line, LineStoreError};
use tracing::trace;

/// Inclusive 1-based line range as written in a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of indices covered; 0 for an inverted range.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One committed mutation.
#[derive(Debug, Clone)]
pub enum Command {
    Change {
        range: LineRange,
        /// Lines written, in range order.
        saved: Vec<Line>,
        lines_reached: usize,
        /// 1-based index of the latest delete before this change, 0 if none.
        last_delete: usize,
    },
    Delete {
        /// Range as requested, before clamping.
        range: LineRange,
        /// Entire document after the delete ran.
        saved: Vec<Line>,
        lines_reached: usize,
    },
}

impl Command {
    pub fn range(&self) -> LineRange {
        match self {
            Command::Change { range, .. } | Command::Delete { range, .. } => *range,
        }
    }

    pub fn lines_reached(&self) -> usize {
        match self {
            Command::Change { lines_reached, .. } | Command::Delete { lines_reached, .. } => {
                *lines_reached
            }
        }
    }

    pub fn saved(&self) -> &[Line] {
        match self {
            Command::Change { saved, .. } | Command::Delete { saved, .. } => saved,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Command::Delete { .. })
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Command::Change { .. } => "change",
            Command::Delete { .. } => "delete",
        }
    }
}

/// Outcome of a single reconstruction, used for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    /// 1-based index of the delete used as base (0 when rebuilt from empty
    /// or when the target entry is itself a delete).
    pub base: usize,
    /// Change records reapplied on top of the base.
    pub replayed: usize,
}

#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<Command>,
    last_delete: usize,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based index of the most recent delete, 0 if none.
    pub fn last_delete(&self) -> usize {
        self.last_delete
    }

    /// Append a command and return its 1-based index.
    pub fn append(&mut self, cmd: Command) -> usize {
        let is_delete = cmd.is_delete();
        self.entries.push(cmd);
        let index = self.entries.len();
        if is_delete {
            self.last_delete = index;
        }
        index
    }

    /// Entry at 1-based `index`.
    pub fn entry(&self, index: usize) -> Option<&Command> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Keep the first `keep` entries and drop the rest. Returns how many were
    /// dropped. Lines referenced only by dropped entries are freed here.
    pub fn truncate_from(&mut self, keep: usize) -> usize {
        if keep >= self.entries.len() {
            return 0;
        }
        let dropped = self.entries.len() - keep;
        self.entries.truncate(keep);
        self.last_delete = match self.entries.last() {
            None => 0,
            Some(Command::Delete { .. }) => self.entries.len(),
            Some(Command::Change { last_delete, .. }) => *last_delete,
        };
        dropped
    }

    /// Document state after the first `cursor` entries (clamped to the log).
    pub fn state_at(&self, cursor: usize) -> Result<(Document, Replay), LineStoreError> {
        let cursor = cursor.min(self.entries.len());
        let Some(target) = cursor.checked_sub(1).map(|i| &self.entries[i]) else {
            return Ok((Document::new(), Replay { base: 0, replayed: 0 }));
        };
        let (mut doc, first, base) = match target {
            Command::Delete { saved, .. } => {
                return Ok((
                    Document::from_lines(saved.clone()),
                    Replay { base: cursor, replayed: 0 },
                ));
            }
            Command::Change {
                lines_reached,
                last_delete: 0,
                ..
            } => (Document::with_capacity(*lines_reached), 0, 0),
            Command::Change {
                lines_reached,
                last_delete,
                ..
            } => {
                let mut base = Vec::with_capacity(*lines_reached);
                base.extend_from_slice(self.entries[*last_delete - 1].saved());
                (Document::from_lines(base), *last_delete, *last_delete)
            }
        };
        let mut replayed = 0;
        for entry in &self.entries[first..cursor] {
            if let Command::Change { range, saved, .. } = entry {
                doc.write_run(range.start, saved)?;
                replayed += 1;
            }
        }
        debug_assert_eq!(doc.len(), target.lines_reached());
        trace!(target: "state.history", cursor, base, replayed, lines = doc.len(), "state_at");
        Ok((doc, Replay { base, replayed }))
    }
}
