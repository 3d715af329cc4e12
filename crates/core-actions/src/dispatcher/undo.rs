//! Undo / redo handling.
//!
//! Neither directive touches the document. They only open or extend the
//! pending [`HistorySequence`]; the dispatcher resolves it later.

use super::DispatchResult;
use super::sequence::HistorySequence;
use core_state::EditorState;

fn open<'a>(
    state: &EditorState,
    pending: &'a mut Option<HistorySequence>,
) -> &'a mut HistorySequence {
    pending.get_or_insert_with(|| HistorySequence::open(state.history_pointer(), state.log().len()))
}

pub(crate) fn handle_undo(
    state: &EditorState,
    pending: &mut Option<HistorySequence>,
    n: usize,
) -> DispatchResult {
    let seq = open(state, pending);
    seq.undo(n);
    tracing::trace!(target: "actions.dispatch", op = "undo", n, cursor = seq.cursor(), net = seq.net(), "history_step");
    DispatchResult::clean()
}

pub(crate) fn handle_redo(
    state: &EditorState,
    pending: &mut Option<HistorySequence>,
    n: usize,
) -> DispatchResult {
    let seq = open(state, pending);
    seq.redo(n);
    tracing::trace!(target: "actions.dispatch", op = "redo", n, cursor = seq.cursor(), net = seq.net(), "history_step");
    DispatchResult::clean()
}
