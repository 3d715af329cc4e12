//! Editor session state: the live document, the command log and the history
//! cursor.
//!
//! `EditorState` is the single owner of all mutable editing state. Mutations
//! (`apply_change`, `apply_delete`) edit the document in place and append to
//! the log; history navigation moves the cursor and rebuilds the document
//! through [`history::CommandLog::state_at`].
//!
//! Cursor model:
//! - `history_pointer` is the number of active log entries. Entries at or
//!   beyond it are redo-able.
//! - `materialized` is the cursor the document currently reflects. It only
//!   differs from `history_pointer` while a run of undo/redo/print directives
//!   is being resolved (see `core-actions::dispatcher::sequence`).
//! - A mutation issued while `history_pointer < log.len()` discards the
//!   redo suffix first. There is no separate wipe flag; the comparison is the
//!   flag.

use core_text::{Document, Line, LineStoreError};
use thiserror::Error;
use tracing::{debug, trace};

pub mod history;
pub use history::{Command, CommandLog, LineRange, Replay};

/// Rejections for change directives that would break the line store's
/// contiguity. State is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("invalid change range {start},{end}")]
    InvalidRange { start: usize, end: usize },
    #[error("change {start},{end} expects {expected} lines, got {got}")]
    PayloadMismatch {
        start: usize,
        end: usize,
        expected: usize,
        got: usize,
    },
    #[error("change starting at line {start} leaves a gap after line {len}")]
    NonContiguous { start: usize, len: usize },
    #[error(transparent)]
    LineStore(#[from] LineStoreError),
}

/// Counters describing history activity over the session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub changes: u64,
    pub deletes: u64,
    pub reconstructions: u64,
    /// Change records reapplied across all reconstructions.
    pub replayed_changes: u64,
    /// Log entries discarded by redo wipes.
    pub wiped_entries: u64,
}

#[derive(Debug, Default)]
pub struct EditorState {
    document: Document,
    log: CommandLog,
    history_pointer: usize,
    materialized: usize,
    stats: HistoryStats,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn history_pointer(&self) -> usize {
        self.history_pointer
    }

    /// Cursor position the live document currently reflects.
    pub fn materialized(&self) -> usize {
        self.materialized
    }

    pub fn stats(&self) -> HistoryStats {
        self.stats
    }

    /// Number of entries that can be redone from the committed cursor.
    pub fn redo_depth(&self) -> usize {
        self.log.len() - self.history_pointer
    }

    /// Write `lines` into `[start, end]`, growing the document as needed.
    pub fn apply_change(
        &mut self,
        start: usize,
        end: usize,
        lines: Vec<Line>,
    ) -> Result<(), EditError> {
        if start == 0 || end < start {
            return Err(EditError::InvalidRange { start, end });
        }
        let expected = end - start + 1;
        if lines.len() != expected {
            return Err(EditError::PayloadMismatch {
                start,
                end,
                expected,
                got: lines.len(),
            });
        }
        if start > self.document.len() + 1 {
            return Err(EditError::NonContiguous {
                start,
                len: self.document.len(),
            });
        }
        self.commit_cursor();
        self.wipe_redo();

        let before = self.document.len();
        let overwrite = before.min(end).saturating_sub(start - 1);
        self.document.write_run(start, &lines)?;
        let lines_reached = self.document.len();
        debug_assert_eq!(lines_reached, before + expected - overwrite);

        let index = self.log.append(Command::Change {
            range: LineRange::new(start, end),
            saved: lines,
            lines_reached,
            last_delete: self.log.last_delete(),
        });
        self.advance(index);
        self.stats.changes += 1;
        trace!(target: "state.history", index, start, end, overwrite, lines = lines_reached, "apply_change");
        Ok(())
    }

    /// Remove `[start, min(end, len)]`. Always logs a delete, even when
    /// nothing is removed.
    pub fn apply_delete(&mut self, start: usize, end: usize) {
        self.commit_cursor();
        self.wipe_redo();

        // `0,0` is left alone; `0,n` deletes from the first line.
        let from = if start == 0 && end != 0 { 1 } else { start };
        let removed = self.document.remove_range(from, end);
        let lines_reached = self.document.len();
        let index = self.log.append(Command::Delete {
            range: LineRange::new(start, end),
            saved: self.document.snapshot(),
            lines_reached,
        });
        self.advance(index);
        self.stats.deletes += 1;
        trace!(target: "state.history", index, start, end, removed, lines = lines_reached, "apply_delete");
    }

    /// Rebuild the document for `target` (clamped to the log) without
    /// committing the history pointer.
    pub fn materialize(&mut self, target: usize) {
        let target = target.min(self.log.len());
        if target != self.materialized {
            self.reconstruct(target);
        }
    }

    /// Move the committed cursor to `target` (clamped), rebuilding the
    /// document if it does not already reflect that position.
    pub fn seek(&mut self, target: usize) {
        let target = target.min(self.log.len());
        self.materialize(target);
        if target != self.history_pointer {
            debug!(target: "state.history", from = self.history_pointer, to = target, log_len = self.log.len(), "seek");
        }
        self.history_pointer = target;
    }

    /// Undo up to `n` entries; extra steps past the start are ignored.
    pub fn undo(&mut self, n: usize) {
        self.seek(self.history_pointer.saturating_sub(n));
    }

    /// Redo up to `n` entries; extra steps past the log end are ignored.
    pub fn redo(&mut self, n: usize) {
        self.seek(self.history_pointer.saturating_add(n));
    }

    /// Unconditionally rebuild the document as of `target` (clamped).
    pub fn reconstruct(&mut self, target: usize) {
        let target = target.min(self.log.len());
        match self.log.state_at(target) {
            Ok((doc, replay)) => {
                self.document = doc;
                self.stats.reconstructions += 1;
                self.stats.replayed_changes += replay.replayed as u64;
                self.materialized = target;
                debug!(target: "state.history", cursor = target, base = replay.base, replayed = replay.replayed, lines = self.document.len(), "reconstruct");
            }
            Err(e) => {
                // Only reachable with a corrupt log. The document and
                // `materialized` keep describing the previous position.
                tracing::error!(target: "state.history", ?e, cursor = target, kept = self.materialized, "reconstruct_failed");
            }
        }
    }

    /// Drop every log entry at or after the history pointer.
    pub fn wipe_redo(&mut self) {
        if self.history_pointer >= self.log.len() {
            return;
        }
        let dropped = self.log.truncate_from(self.history_pointer);
        self.stats.wiped_entries += dropped as u64;
        debug!(target: "state.history", dropped, log_len = self.log.len(), last_delete = self.log.last_delete(), "wipe_redo");
    }

    fn commit_cursor(&mut self) {
        if self.materialized != self.history_pointer {
            let target = self.materialized;
            self.seek(target);
        }
    }

    fn advance(&mut self, index: usize) {
        self.history_pointer = index;
        self.materialized = index;
    }
}
