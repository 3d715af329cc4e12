//! Folding runs of undo/redo into one history move.
//!
//! A run starts at the first undo or redo after a mutation and ends at the
//! next change, delete or quit. Each step only moves a simulated cursor,
//! clamped to `[0, log_len]`; the document is rebuilt once when the run is
//! resolved, or when a print inside the run needs to observe it.
//! "3u, 2u, 1r" therefore costs a single reconstruction at net -4.

/// Simulated history cursor for an unresolved undo/redo run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySequence {
    origin: usize,
    cursor: usize,
    log_len: usize,
    steps: usize,
}

impl HistorySequence {
    /// Open a run at the committed `history_pointer`. The log cannot grow
    /// until the run is resolved, so its length is fixed here.
    pub fn open(history_pointer: usize, log_len: usize) -> Self {
        let origin = history_pointer.min(log_len);
        Self {
            origin,
            cursor: origin,
            log_len,
            steps: 0,
        }
    }

    pub fn undo(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
        self.steps += 1;
    }

    pub fn redo(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_add(n).min(self.log_len);
        self.steps += 1;
    }

    /// Position the run currently resolves to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Undo/redo directives folded into this run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Signed distance from the committed pointer to the resolved cursor.
    pub fn net(&self) -> isize {
        self.cursor as isize - self.origin as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_moves() {
        let mut s = HistorySequence::open(10, 10);
        s.undo(3);
        s.undo(2);
        s.redo(1);
        assert_eq!(s.cursor(), 6);
        assert_eq!(s.net(), -4);
        assert_eq!(s.steps(), 3);
    }

    #[test]
    fn undo_clamps_at_zero_and_redo_at_log_end() {
        let mut s = HistorySequence::open(2, 4);
        s.undo(5);
        assert_eq!(s.cursor(), 0);
        s.redo(1);
        assert_eq!(s.cursor(), 1);
        s.redo(usize::MAX);
        assert_eq!(s.cursor(), 4);
        assert_eq!(s.net(), 2);
    }

    #[test]
    fn clamp_is_applied_per_step() {
        // Undo past zero is lost, not banked against later redos.
        let mut s = HistorySequence::open(1, 3);
        s.undo(4);
        s.redo(2);
        assert_eq!(s.cursor(), 2);
    }
}
