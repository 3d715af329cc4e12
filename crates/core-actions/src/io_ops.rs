//! Print output.
//!
//! Synchronous writes straight into the caller's writer; buffering and
//! flushing are the caller's concern.

use std::io::{self, Write};

use core_text::Document;

/// Write lines `[start, end]` of `doc`, one per output line, substituting
/// `placeholder` for indices outside the document. Returns the number of
/// lines written (0 when `start > end`).
pub fn write_range<W: Write>(
    out: &mut W,
    doc: &Document,
    start: usize,
    end: usize,
    placeholder: &str,
) -> io::Result<usize> {
    let mut written = 0;
    for slot in doc.range(start, end) {
        out.write_all(slot.or(placeholder).as_bytes())?;
        out.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}
