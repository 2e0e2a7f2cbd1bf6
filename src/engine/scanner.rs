//! Per-file literal substring scanning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::Occurrence;
use crate::error::EntryFailure;

use super::cancel::CancelToken;

/// Character offsets of every match of `pattern` in `line`, overlaps included.
///
/// After a match at character `c` the search resumes at `c + 1`, so `"AA"` in `"AAA"` yields 0 and 1.
/// `pattern` must be non-empty.
pub struct LineMatches<'a> {
    line: &'a str,
    pattern: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> LineMatches<'a> {
    pub fn new(line: &'a str, pattern: &'a str) -> Self {
        Self {
            line,
            pattern,
            byte_pos: 0,
            char_pos: 0,
        }
    }
}

impl Iterator for LineMatches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pattern.is_empty() || self.byte_pos >= self.line.len() {
            return None;
        }
        let rest = &self.line[self.byte_pos..];
        let found = rest.find(self.pattern)?;
        let offset = self.char_pos + rest[..found].chars().count();
        let at = self.byte_pos + found;
        let step = self.line[at..].chars().next().map_or(1, char::len_utf8);
        self.byte_pos = at + step;
        self.char_pos = offset + 1;
        Some(offset)
    }
}

/// Drop a trailing `\n` or `\r\n`. A lone `\r` is line content.
fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// Scan one file line by line and hand every occurrence to `emit`, in (line, offset) order.
///
/// Lines are split on `\n` and decoded lossily, so bytes that are not UTF-8 become U+FFFD and
/// only affect the line they sit in. Open and read errors come back as [`EntryFailure::Skip`].
/// Cancellation (checked before each line) and a failing `emit` come back as
/// [`EntryFailure::Abort`]. The file handle is dropped on every return path. Returns the number
/// of occurrences emitted.
pub(crate) fn scan_file<F>(
    path: &Path,
    pattern: &str,
    cancel: &CancelToken,
    mut emit: F,
) -> Result<usize, EntryFailure>
where
    F: FnMut(Occurrence) -> Result<(), EntryFailure>,
{
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    let mut line_no = 0_usize;
    let mut count = 0_usize;
    loop {
        cancel.check()?;
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        for offset in LineMatches::new(&line, pattern) {
            emit(Occurrence {
                file: path.to_path_buf(),
                line: line_no,
                offset,
            })?;
            count += 1;
        }
    }
    Ok(count)
}
