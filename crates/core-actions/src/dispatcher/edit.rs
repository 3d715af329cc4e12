//! Change / delete handling.
//!
//! Both mutations go straight to `EditorState`, which wipes any redo suffix
//! before appending to the log.

use super::{DispatchError, DispatchResult};
use core_state::EditorState;
use core_text::Line;

pub(crate) fn handle_change(
    state: &mut EditorState,
    start: usize,
    end: usize,
    lines: Vec<Line>,
) -> Result<DispatchResult, DispatchError> {
    let before = state.document().len();
    state.apply_change(start, end, lines)?;
    tracing::trace!(target: "actions.dispatch", op = "change", start, end, grew = state.document().len() - before, "edit");
    Ok(DispatchResult::clean())
}

pub(crate) fn handle_delete(state: &mut EditorState, start: usize, end: usize) -> DispatchResult {
    let before = state.document().len();
    state.apply_delete(start, end);
    tracing::trace!(target: "actions.dispatch", op = "delete", start, end, removed = before - state.document().len(), "edit");
    DispatchResult::clean()
}
