use std::fmt;
use std::str::{from_utf8, Utf8Error};

use unicode_width::UnicodeWidthStr;

/// Byte range of a construct in the parsed statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Byte offset of the first byte of the construct
    pub start: u64,
    /// Byte offset just past the construct
    pub end: u64,
}

/// Line and column of an offset in the parsed statement
#[derive(PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    /// One-based line number
    pub line: usize,
    /// One-based column number
    pub column: usize,
    /// Byte offset in the statement
    pub offset: u64,
}

/// Zero-based position, as computed from the source text
#[derive(Clone, Copy, Debug)]
pub struct InflatedPos {
    pub line: u64,
    /// Display width of the line prefix
    pub column: u64,
    pub offset: u64,
    /// Character offset in the whole statement
    pub char_offset: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum InflatingError {
    #[error(transparent)]
    Utf8(Utf8Error),
    #[error("offset out of range")]
    OutOfRange,
}

impl Span {
    pub fn new(start: u64, end: u64) -> Span {
        Span { start, end }
    }

    pub fn combine(self, right: Span) -> Span {
        Span {
            start: self.start,
            end: right.end,
        }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.column)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Counts line breaks, treating `\r\n` as a single one.
fn line_breaks(data: &[u8]) -> u64 {
    let mut after_cr = false;
    let mut lines = 0;
    for byte in data {
        match byte {
            b'\n' if after_cr => after_cr = false,
            b'\n' => lines += 1,
            b'\r' => {
                lines += 1;
                after_cr = true;
            }
            _ => after_cr = false,
        }
    }
    lines
}

impl InflatedPos {
    pub fn from_offset(data: &[u8], offset: u64) -> Result<InflatedPos, InflatingError> {
        let offset = usize::try_from(offset).map_err(|_| InflatingError::OutOfRange)?;
        if offset > data.len() {
            return Err(InflatingError::OutOfRange);
        }
        let prefix = from_utf8(&data[..offset]).map_err(InflatingError::Utf8)?;
        let line_start = prefix.rfind(['\r', '\n']).map_or(0, |i| i + 1);
        let column = &prefix[line_start..];
        Ok(InflatedPos {
            line: line_breaks(prefix.as_bytes()),
            column: UnicodeWidthStr::width(column) as u64,
            offset: offset as u64,
            char_offset: prefix.chars().count() as u64,
        })
    }

    pub fn deflate(self) -> Pos {
        Pos {
            line: self.line as usize + 1,
            column: self.column as usize + 1,
            offset: self.offset,
        }
    }
}
