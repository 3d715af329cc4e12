//! Property tests: the log-based reconstruction must agree with a model that
//! stores a full copy of the document after every command.

use core_state::EditorState;
use core_text::line;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Change { start_seed: usize, count: usize },
    Delete { start: usize, end: usize },
    Undo(usize),
    Redo(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..64, 1usize..4).prop_map(|(start_seed, count)| Op::Change { start_seed, count }),
        2 => (0usize..8, 0usize..10).prop_map(|(start, end)| Op::Delete { start, end }),
        2 => (0usize..5).prop_map(Op::Undo),
        2 => (0usize..5).prop_map(Op::Redo),
    ]
}

/// Snapshot-per-step reference model.
struct Model {
    states: Vec<Vec<String>>,
    pointer: usize,
}

impl Model {
    fn new() -> Self {
        Self {
            states: vec![Vec::new()],
            pointer: 0,
        }
    }

    fn current(&self) -> &Vec<String> {
        &self.states[self.pointer]
    }

    fn commit(&mut self, next: Vec<String>) {
        self.states.truncate(self.pointer + 1);
        self.states.push(next);
        self.pointer += 1;
    }

    fn change(&mut self, start: usize, payload: &[String]) {
        let mut next = self.current().clone();
        for (i, text) in payload.iter().enumerate() {
            let idx = start + i - 1;
            if idx < next.len() {
                next[idx] = text.clone();
            } else {
                next.push(text.clone());
            }
        }
        self.commit(next);
    }

    fn delete(&mut self, start: usize, end: usize) {
        let mut next = self.current().clone();
        let from = if start == 0 && end != 0 { 1 } else { start };
        if from != 0 && from <= next.len() && end >= from {
            next.drain(from - 1..end.min(next.len()));
        }
        self.commit(next);
    }
}

fn texts(state: &EditorState) -> Vec<String> {
    state.document().iter().map(str::to_owned).collect()
}

proptest! {
    #[test]
    fn log_replay_matches_snapshot_model(ops in prop::collection::vec(op(), 0..48)) {
        let mut state = EditorState::new();
        let mut model = Model::new();
        for (step, op) in ops.iter().enumerate() {
            match *op {
                Op::Change { start_seed, count } => {
                    let start = 1 + start_seed % (model.current().len() + 1);
                    let payload: Vec<String> = (0..count).map(|i| format!("s{step}l{i}")).collect();
                    state
                        .apply_change(start, start + count - 1, payload.iter().map(line).collect())
                        .unwrap();
                    model.change(start, &payload);
                }
                Op::Delete { start, end } => {
                    state.apply_delete(start, end);
                    model.delete(start, end);
                }
                Op::Undo(n) => {
                    state.undo(n);
                    model.pointer = model.pointer.saturating_sub(n);
                }
                Op::Redo(n) => {
                    state.redo(n);
                    model.pointer = (model.pointer + n).min(model.states.len() - 1);
                }
            }
            prop_assert_eq!(state.history_pointer(), model.pointer);
            prop_assert_eq!(state.log().len(), model.states.len() - 1);
            prop_assert_eq!(&texts(&state), model.current());
            if let Some(entry) = state.log().entry(state.history_pointer()) {
                prop_assert_eq!(entry.lines_reached(), state.document().len());
            }
        }
    }

    #[test]
    fn reconstruct_is_idempotent(counts in prop::collection::vec(1usize..4, 1..20), target_seed in 0usize..32) {
        let mut state = EditorState::new();
        for (step, count) in counts.iter().enumerate() {
            let start = 1 + step % (state.document().len() + 1);
            let payload = (0..*count).map(|i| line(format!("{step}.{i}"))).collect();
            state.apply_change(start, start + count - 1, payload).unwrap();
            if step % 5 == 4 {
                state.apply_delete(1, 1);
            }
        }
        let target = target_seed % (state.log().len() + 1);
        state.reconstruct(target);
        let first = texts(&state);
        state.reconstruct(target);
        prop_assert_eq!(texts(&state), first);
    }

    #[test]
    fn undo_then_redo_round_trips(counts in prop::collection::vec(1usize..4, 1..24), back in 0usize..30) {
        let mut state = EditorState::new();
        for (step, count) in counts.iter().enumerate() {
            if step % 3 == 2 {
                state.apply_delete(step % 4, step % 4 + 1);
                continue;
            }
            let start = 1 + (step * 7) % (state.document().len() + 1);
            let payload = (0..*count).map(|i| line(format!("{step}:{i}"))).collect();
            state.apply_change(start, start + count - 1, payload).unwrap();
        }
        let before = texts(&state);
        let pointer = state.history_pointer();
        state.undo(back);
        state.redo(back);
        prop_assert_eq!(state.history_pointer(), pointer);
        prop_assert_eq!(texts(&state), before);
    }
}

#[test]
fn change_only_history_matches_naive_replay_at_every_step() {
    let mut state = EditorState::new();
    let mut naive: Vec<String> = Vec::new();
    let edits: &[(usize, &[&str])] = &[
        (1, &["a", "b", "c"]),
        (2, &["B"]),
        (4, &["d", "e"]),
        (1, &["A", "BB", "C", "D", "E", "f"]),
    ];
    for (start, payload) in edits {
        state
            .apply_change(*start, start + payload.len() - 1, payload.iter().map(line).collect())
            .unwrap();
        for (i, text) in payload.iter().enumerate() {
            let idx = start + i - 1;
            if idx < naive.len() {
                naive[idx] = text.to_string();
            } else {
                naive.push(text.to_string());
            }
        }
        state.reconstruct(state.history_pointer());
        assert_eq!(texts(&state), naive);
    }
}
