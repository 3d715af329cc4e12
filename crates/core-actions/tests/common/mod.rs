#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{DirectiveReader, Dispatcher, RunSummary};
use std::io::Cursor;

/// Run `script` through a fresh dispatcher, returning everything printed.
pub fn run_script(script: &str) -> (String, Dispatcher) {
    let mut dispatcher = Dispatcher::new();
    let (out, _) = run_with(&mut dispatcher, script).expect("script runs");
    (out, dispatcher)
}

pub fn run_with(
    dispatcher: &mut Dispatcher,
    script: &str,
) -> Result<(String, RunSummary), core_actions::DispatchError> {
    let mut reader = DirectiveReader::new(Cursor::new(script));
    let mut out = Vec::new();
    let summary = dispatcher.run(&mut reader, &mut out)?;
    Ok((String::from_utf8(out).expect("utf8 output"), summary))
}

/// `n` numbered lines `L1..Ln` as a change directive at line 1.
pub fn numbered(n: usize) -> String {
    let mut s = format!("1,{n}c\n");
    for i in 1..=n {
        s.push_str(&format!("L{i}\n"));
    }
    s.push_str(".\n");
    s
}

pub fn document(dispatcher: &Dispatcher) -> Vec<String> {
    dispatcher
        .state()
        .document()
        .iter()
        .map(str::to_owned)
        .collect()
}
