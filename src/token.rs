use std::ops::Range;

/// Line/column location used for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Compute the 1-based line and column of a byte offset.
    #[must_use]
    pub fn of_offset<S: AsRef<[u8]> + ?Sized>(source: &S, offset: usize) -> Self {
        let bytes = source.as_ref();
        let offset = offset.min(bytes.len());
        let before = &bytes[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Self {
            line,
            column: offset - line_start + 1,
        }
    }
}

/// Half-open byte range `[start, end)` into the source buffer.
///
/// Spans never own text; the source is the only owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Token kinds produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Collapsed run of whitespace.
    Empty,
    /// `//` run or `/* ... */` block, including trailing blank lines.
    Comment,
    /// Preprocessor line (`#...`).
    Directive,
    /// Character literal (`'a'`).
    CharLiteral,
    /// String literal, ordinary or raw.
    StringLiteral,
    /// Identifier, possibly qualified (`A::B::c`).
    Identifier,
    /// `public:`, `protected:` or `private:`.
    AccessModifier,
    /// `namespace` keyword.
    NamespaceKeyword,
    /// `class` keyword.
    ClassKeyword,
    /// `struct` keyword.
    StructKeyword,
    /// `enum` keyword.
    EnumKeyword,
    /// Parenthesized parameter or argument list.
    Parameters,
    /// Identifier that names a function being declared or defined.
    FunctionName,
    /// Identifier that names a constructor or destructor.
    ConstructorDestructor,
    /// Constructor member-initializer region (`: a(1), b{2}`).
    InitializerList,
    /// Opening brace `{`.
    BeginGroup,
    /// Closing brace `}`.
    EndGroup,
    /// Semicolon `;`.
    StatementTerminator,
    /// Scope resolution operator `::`.
    ScopeResolution,
    /// Continues the preceding token. Folded during merging and never
    /// present in a finished stream.
    TypeContinuation,
    /// Unclassified source text between recognized tokens.
    Passthrough,
    /// Zero-width sentinel at the end of the source.
    Eof,
}

impl TokenKind {
    /// Whitespace and comments, skipped when looking behind for merges.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Empty | Self::Comment)
    }

    /// Keywords that introduce a namespace, class, struct or enum.
    #[must_use]
    pub const fn is_container_keyword(self) -> bool {
        matches!(
            self,
            Self::NamespaceKeyword | Self::ClassKeyword | Self::StructKeyword | Self::EnumKeyword
        )
    }
}

/// A classified span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }

    /// The slice of `source` this token covers.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.range()).unwrap_or("")
    }

    /// Byte form of [`text`](Self::text), for sources that are not UTF-8.
    #[must_use]
    pub fn bytes<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        source.get(self.span.range()).unwrap_or(&[])
    }
}
