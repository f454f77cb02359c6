use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Default, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct SourcePos(pub usize);

impl fmt::Debug for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open range of source positions: describes a span of text in a [`Source`].
/// [`std::ops::Range<SourcePos>`] has worse ergonomics: in particular it's not [`Copy`]!
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceSpan {
    pub start: SourcePos,
    pub end: SourcePos,
}

impl SourceSpan {
    pub fn new(start: SourcePos, end: SourcePos) -> Self {
        Self { start, end }
    }

    pub fn empty(pos: SourcePos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn contains(&self, pos: SourcePos) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// 1-based line and column in a named source file, as tracked by the lexer.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub filename: String,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            filename: filename.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    /// Create a Source object for a string
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn end(&self) -> SourcePos {
        SourcePos(self.text.len())
    }

    pub fn peek(&self, pos: SourcePos) -> Option<char> {
        self.text[pos.0..].chars().next()
    }

    pub fn scan_forward(
        &self,
        pos: SourcePos,
        mut while_char: impl FnMut(char) -> bool,
    ) -> SourcePos {
        match self.text[pos.0..].find(|c: char| !while_char(c)) {
            Some(len) => SourcePos(pos.0 + len),
            None => self.end(),
        }
    }

    /// Return the span for the line containing a position
    pub fn line_span(&self, pos: SourcePos) -> SourceSpan {
        let pos = SourcePos(pos.0.min(self.text.len()));
        let start = SourcePos(match self.text[..pos.0].rfind('\n') {
            Some(pos) => pos + 1,
            None => 0,
        });
        let end = SourcePos(match self.text[pos.0..].find('\n') {
            Some(len) => pos.0 + len,
            None => self.text.len(),
        });
        SourceSpan { start, end }
    }
}

impl std::ops::Index<SourceSpan> for Source {
    type Output = str;

    fn index(&self, value: SourceSpan) -> &Self::Output {
        &self.text[value.start.0..value.end.0]
    }
}
