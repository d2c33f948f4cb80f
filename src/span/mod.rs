use codespan_reporting::files::{self, Files, SimpleFile};

/// A 1-based `(line, column)` location in the program text.
///
/// Ordering is lexicographic: line first, then column.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    line: usize,
    column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Position {
        assert!(line >= 1 && column >= 1);
        Self { line, column }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({}.{})", self.line, self.column)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}

/// Anything the parser hands out that knows where it starts in the source.
pub trait HasSourcePosition {
    fn line(&self) -> usize;
    fn column(&self) -> usize;

    fn position(&self) -> Position {
        Position::new(self.line(), self.column())
    }
}

/// A positioned node that also exposes its source text.
///
/// Call nodes return the callee name, so parameter diagnostics can name the
/// function being called.
pub trait SyntaxNode: HasSourcePosition {
    fn text(&self) -> &str;
}

impl HasSourcePosition for Position {
    fn line(&self) -> usize {
        self.line
    }

    fn column(&self) -> usize {
        self.column
    }

    fn position(&self) -> Position {
        *self
    }
}

impl<T: HasSourcePosition + ?Sized> HasSourcePosition for &T {
    fn line(&self) -> usize {
        (**self).line()
    }

    fn column(&self) -> usize {
        (**self).column()
    }
}

impl<T: SyntaxNode + ?Sized> SyntaxNode for &T {
    fn text(&self) -> &str {
        (**self).text()
    }
}

/// A lexeme with its text and starting position, for callers whose tree does
/// not carry positions of its own.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({:?}, {:?})", self.text, self.position)
    }
}

impl HasSourcePosition for Token {
    fn line(&self) -> usize {
        self.position.line
    }

    fn column(&self) -> usize {
        self.position.column
    }
}

impl SyntaxNode for Token {
    fn text(&self) -> &str {
        &self.text
    }
}

/// Byte range into a [`SourceFile`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl From<std::ops::Range<usize>> for Span {
    fn from(value: std::ops::Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Span({}..{})", self.lo, self.hi)
    }
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Span {
        assert!(lo <= hi);
        Self { lo, hi }
    }
}

/// The text of one compilation unit, used to translate byte offsets into
/// positions and back.
#[derive(Debug, Clone)]
pub struct SourceFile {
    file: SimpleFile<String, String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: SimpleFile::new(name.into(), source.into()),
        }
    }

    pub fn name(&self) -> &str {
        self.file.name()
    }

    pub fn source(&self) -> &str {
        self.file.source()
    }

    pub(crate) fn files(&self) -> &SimpleFile<String, String> {
        &self.file
    }

    /// Position of the character starting at byte `offset`.
    pub fn position_at(&self, offset: usize) -> Result<Position, files::Error> {
        let line_index = self.file.line_index((), offset)?;
        let line = self.file.line_number((), line_index)?;
        let column = self.file.column_number((), line_index, offset)?;
        Ok(Position::new(line, column))
    }

    /// Position where `span` starts.
    pub fn position_of(&self, span: Span) -> Result<Position, files::Error> {
        self.position_at(span.lo)
    }

    /// Byte range of the character at `position`, or the empty range at the
    /// end of the line when the column points past it. `None` when the line
    /// does not exist.
    pub fn char_range(&self, position: Position) -> Option<std::ops::Range<usize>> {
        let line = self.file.line_range((), position.line() - 1).ok()?;
        let text = &self.source()[line.clone()];
        let text = text.trim_end_matches(['\n', '\r']);
        match text.char_indices().nth(position.column() - 1) {
            Some((at, c)) => Some(line.start + at..line.start + at + c.len_utf8()),
            None => {
                let end = line.start + text.len();
                Some(end..end)
            }
        }
    }
}
