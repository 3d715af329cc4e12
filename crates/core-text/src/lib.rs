//! Line store: the live document as an ordered sequence of shared lines.
//!
//! Lines are `Rc<str>` values. Once created a line is never copied; the
//! document and any history records that mention it hold clones of the same
//! reference, so dropping the last holder frees the text.
//!
//! External indexing is 1-based throughout. Reads outside `[1, len]` never
//! fail and resolve to [`Slot::Blank`]; writes may only target an existing
//! line or the slot directly after the last one.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// A single immutable line of text, stored without its terminator.
pub type Line = Rc<str>;

/// Build a [`Line`] from anything string-like.
pub fn line(text: impl AsRef<str>) -> Line {
    Rc::from(text.as_ref())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineStoreError {
    /// Write would leave a hole between the last line and `index`.
    #[error("write to line {index} would leave a gap after line {len}")]
    GapWrite { index: usize, len: usize },
}

/// Result of reading an index that may be out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Text(&'a str),
    Blank,
}

impl Slot<'_> {
    /// Text of the slot, substituting `placeholder` for blanks.
    pub fn or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            Slot::Text(s) => *s,
            Slot::Blank => placeholder,
        }
    }
}

impl fmt::Display for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.or("."))
    }
}

/// The live document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
        }
    }

    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Number of lines (`curr_lines`).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at 1-based `index`, or [`Slot::Blank`] when out of range.
    pub fn get(&self, index: usize) -> Slot<'_> {
        match index.checked_sub(1).and_then(|i| self.lines.get(i)) {
            Some(l) => Slot::Text(&**l),
            None => Slot::Blank,
        }
    }

    /// Set line `index`, appending when `index == len + 1`.
    pub fn overwrite_or_append(&mut self, index: usize, line: Line) -> Result<(), LineStoreError> {
        let len = self.lines.len();
        match index {
            i if i >= 1 && i <= len => {
                self.lines[i - 1] = line;
                Ok(())
            }
            i if i == len + 1 => {
                self.lines.push(line);
                Ok(())
            }
            _ => Err(LineStoreError::GapWrite { index, len }),
        }
    }

    /// Write `lines` into consecutive slots starting at `start`.
    pub fn write_run(&mut self, start: usize, lines: &[Line]) -> Result<(), LineStoreError> {
        for (offset, l) in lines.iter().enumerate() {
            self.overwrite_or_append(start + offset, Rc::clone(l))?;
        }
        Ok(())
    }

    /// Remove lines `[start, min(end, len)]`, shifting later lines left.
    /// Returns the number of lines removed; out-of-range or inverted spans
    /// remove nothing.
    pub fn remove_range(&mut self, start: usize, end: usize) -> usize {
        let len = self.lines.len();
        if start == 0 || start > len || end < start {
            return 0;
        }
        let last = end.min(len);
        self.lines.drain(start - 1..last);
        last - start + 1
    }

    pub fn truncate(&mut self, len: usize) {
        self.lines.truncate(len);
    }

    /// Swap in an entirely new backing sequence.
    pub fn replace_all(&mut self, lines: Vec<Line>) {
        self.lines = lines;
    }

    /// Copy of the reference sequence; the text itself is shared.
    pub fn snapshot(&self) -> Vec<Line> {
        self.lines.clone()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| &**l)
    }

    /// Iterate slots for the inclusive range `[start, end]`. Empty when
    /// `start > end`.
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = Slot<'_>> {
        (start..=end).map(|i| self.get(i))
    }
}
