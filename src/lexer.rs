use std::fmt;
use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::{debug, trace};

use crate::merge::TokenWindow;
use crate::scope::{ScopeStack, Underflow};
use crate::token::{Position, Token, TokenKind};

/// Maximum number of characters of source kept in a [`ScanError`].
pub const SNIPPET_LEN: usize = 28;

/// UTF-8 byte order mark.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?-u)^(?:['"?\\abfnrtv]|[0-7]{1,3}|x[0-9A-Fa-f]{2}|u[0-9A-Fa-f]{4}|U[0-9A-Fa-f]{8})"#)
        .unwrap_or_else(|e| unreachable!("escape pattern: {e}"))
});

static RAW_STRING_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^([^()\\\s]{0,16})\(")
        .unwrap_or_else(|e| unreachable!("raw string pattern: {e}"))
});

/// Classifies a scanner error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// String literal without a closing quote on its line.
    UnterminatedLiteral,
    /// `/*` without a matching `*/`.
    UnterminatedComment,
    /// Backslash not followed by a valid escape sequence.
    MalformedEscape,
    /// `}` without a matching `{`.
    UnbalancedBrace,
    /// `)` without a matching `(`.
    UnbalancedParenthesis,
    /// `''`.
    EmptyCharLiteral,
    /// Character literal holding more than one character or never closed.
    MissingCharDelimiter,
    /// `R"` not followed by a valid `delim( ... )delim"` body.
    InvalidRawString,
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedLiteral => write!(f, "unterminated string literal"),
            Self::UnterminatedComment => {
                write!(f, "unterminated block comment, expected '*/'")
            }
            Self::MalformedEscape => write!(f, "invalid escape sequence"),
            Self::UnbalancedBrace => write!(f, "extra '}}' without a matching '{{'"),
            Self::UnbalancedParenthesis => write!(f, "extra ')' without a matching '('"),
            Self::EmptyCharLiteral => write!(f, "empty character literal"),
            Self::MissingCharDelimiter => {
                write!(f, "character literal is missing its closing '")
            }
            Self::InvalidRawString => write!(f, "invalid raw string literal"),
        }
    }
}

/// Error produced while scanning, positioned by line with a short excerpt of
/// the offending source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line} near `{snippet}`")]
pub struct ScanError {
    pub kind: ScanErrorKind,
    pub line: usize,
    pub snippet: String,
}

/// Nesting frames tracked while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    None,
    Namespace,
    Class,
    Struct,
    Enum,
    Function,
    ConstructorDestructor,
    InitializerList,
}

/// Scan a source buffer into a contiguous, lossless token stream.
///
/// # Errors
///
/// Returns `ScanError` on malformed literals, escapes or comments, and on
/// an unmatched `}` or `)`. Scanning stops at the first error.
pub fn scan(source: &str) -> Result<Vec<Token>, ScanError> {
    scan_bytes(source.as_bytes())
}

/// Scan a source that is not necessarily UTF-8. Bytes outside the ASCII
/// range only ever appear inside literals, comments and passthrough text.
///
/// A leading byte order mark becomes a passthrough token of its own.
///
/// # Errors
///
/// Same as [`scan`].
pub fn scan_bytes(source: &[u8]) -> Result<Vec<Token>, ScanError> {
    Scanner::new(source).scan()
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    scopes: ScopeStack<FrameKind>,
    window: TokenWindow,
    next_container: FrameKind,
    container_name: String,
    last_identifier: String,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            scopes: ScopeStack::new(FrameKind::None),
            window: TokenWindow::new(),
            next_container: FrameKind::None,
            container_name: String::new(),
            last_identifier: String::new(),
        }
    }

    fn scan(mut self) -> Result<Vec<Token>, ScanError> {
        if self.input.starts_with(BOM) {
            self.pos = BOM.len();
            self.window
                .push(Token::new(TokenKind::Passthrough, 0, self.pos));
        }

        while let Some(&ch) = self.input.get(self.pos) {
            let begin = self.pos;

            let kind = match ch {
                b'\'' => {
                    self.read_char_literal()?;
                    Some(TokenKind::CharLiteral)
                }
                b'"' => {
                    self.read_string()?;
                    Some(TokenKind::StringLiteral)
                }
                b'#' => {
                    self.read_directive();
                    Some(TokenKind::Directive)
                }
                b';' => {
                    self.pos += 1;
                    // Prototypes and forward declarations have no body.
                    self.next_container = FrameKind::None;
                    Some(TokenKind::StatementTerminator)
                }
                b'{' => {
                    self.pos += 1;
                    self.open_brace();
                    Some(TokenKind::BeginGroup)
                }
                b'}' => Some(self.close_brace()?),
                b'/' => self.read_comment()?.then_some(TokenKind::Comment),
                b'(' => {
                    self.open_paren();
                    Some(TokenKind::Parameters)
                }
                b')' => Some(self.close_paren()?),
                b',' => self.read_comma(),
                b':' => self.read_colon(),
                b'0'..=b'9' => {
                    self.skip_number();
                    None
                }
                b'_' | b'a'..=b'z' | b'A'..=b'Z' => Some(self.read_identifier()),
                c if is_space(c) => {
                    while self.peek().is_some_and(is_space) {
                        self.pos += 1;
                    }
                    Some(TokenKind::Empty)
                }
                _ => {
                    self.pos += 1;
                    None
                }
            };

            if let Some(kind) = kind {
                self.insert(kind, begin);
            }
        }

        self.fill_gap(self.input.len());
        let tokens = self.window.finish(self.input.len());
        debug!(tokens = tokens.len(), bytes = self.input.len(), "scanned source");
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn error(&self, kind: ScanErrorKind, at: usize) -> ScanError {
        ScanError {
            kind,
            line: Position::of_offset(self.input, at).line,
            snippet: snippet(self.input, at),
        }
    }

    // ─── Token insertion ────────────────────────────────────────────

    fn insert(&mut self, kind: TokenKind, begin: usize) {
        if self.absorbed_by_last(kind) && self.window.extend_last(self.pos) {
            return;
        }
        self.fill_gap(begin);
        self.window.push(Token::new(kind, begin, self.pos));
    }

    /// Unclassified bytes between the last token and `begin`.
    fn fill_gap(&mut self, begin: usize) {
        let gap_start = self.window.end();
        if begin > gap_start {
            self.window
                .push(Token::new(TokenKind::Passthrough, gap_start, begin));
        }
    }

    /// Whether a new token of `kind` continues the most recent token
    /// instead of starting a new one.
    fn absorbed_by_last(&self, kind: TokenKind) -> bool {
        if kind == TokenKind::TypeContinuation {
            return true;
        }
        let Some(last) = self.window.last() else {
            return false;
        };
        match last.kind {
            TokenKind::Parameters => kind == last.kind || self.scopes.top().parens > 0,
            TokenKind::InitializerList => {
                kind == last.kind || self.scopes.kind() == FrameKind::InitializerList
            }
            TokenKind::Comment => kind == last.kind,
            _ => false,
        }
    }

    // ─── Frames ─────────────────────────────────────────────────────

    fn push_frame(&mut self, kind: FrameKind, name: String, braces: usize) {
        trace!(?kind, %name, depth = self.scopes.depth(), "push frame");
        self.scopes.push(kind, name, braces);
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.scopes.pop() {
            trace!(kind = ?frame.kind, name = %frame.name, "pop frame");
        }
    }

    fn open_brace(&mut self) {
        let top = self.scopes.top();
        if self.next_container == FrameKind::None
            || top.kind == FrameKind::InitializerList
            || top.parens > 0
        {
            self.scopes.open_brace();
        } else {
            let name = std::mem::take(&mut self.container_name);
            self.push_frame(self.next_container, name, 1);
            self.next_container = FrameKind::None;
        }
    }

    fn close_brace(&mut self) -> Result<TokenKind, ScanError> {
        let braces = self
            .scopes
            .close_brace()
            .map_err(|_: Underflow| {
                self.error(ScanErrorKind::UnbalancedBrace, self.pos)
            })?;
        self.pos += 1;

        let top = self.scopes.top();
        if top.kind == FrameKind::InitializerList {
            if braces == 0 && top.parens == 0 {
                self.pop_frame();
            }
            Ok(TokenKind::TypeContinuation)
        } else {
            if braces == 0 {
                self.pop_frame();
            }
            Ok(TokenKind::EndGroup)
        }
    }

    fn open_paren(&mut self) {
        let top = self.scopes.top();
        // Text between the identifier and `(` is not a token yet, so
        // `operator==(` still reclassifies `operator`.
        if !matches!(top.kind, FrameKind::Function | FrameKind::InitializerList) {
            let frame_name = top.name.clone();
            let input = self.input;
            if let Some(token) = self
                .window
                .last_significant_mut()
                .filter(|t| t.kind == TokenKind::Identifier)
            {
                if token.bytes(input) == frame_name.as_bytes() {
                    token.kind = TokenKind::ConstructorDestructor;
                    self.next_container = FrameKind::ConstructorDestructor;
                } else {
                    token.kind = TokenKind::FunctionName;
                    self.next_container = FrameKind::Function;
                }
                self.container_name.clone_from(&self.last_identifier);
            }
        }
        self.scopes.open_paren();
        self.pos += 1;
    }

    fn close_paren(&mut self) -> Result<TokenKind, ScanError> {
        let parens = self
            .scopes
            .close_paren()
            .map_err(|_: Underflow| {
                self.error(ScanErrorKind::UnbalancedParenthesis, self.pos)
            })?;
        self.pos += 1;

        let top = self.scopes.top();
        if top.kind == FrameKind::InitializerList {
            if parens == 0 && top.braces == 0 {
                self.pop_frame();
            }
            Ok(TokenKind::TypeContinuation)
        } else {
            Ok(TokenKind::Parameters)
        }
    }

    /// A comma after a finished member initializer starts the next one.
    fn read_comma(&mut self) -> Option<TokenKind> {
        self.pos += 1;
        let follows_initializer = self
            .window
            .last_significant()
            .is_some_and(|t| t.kind == TokenKind::InitializerList);
        if self.scopes.kind() != FrameKind::InitializerList && follows_initializer {
            self.push_frame(FrameKind::InitializerList, String::new(), 0);
            Some(TokenKind::InitializerList)
        } else {
            None
        }
    }

    fn read_colon(&mut self) -> Option<TokenKind> {
        self.pos += 1;
        if self.peek() == Some(b':') {
            self.pos += 1;
            Some(TokenKind::ScopeResolution)
        } else if self.next_container == FrameKind::ConstructorDestructor
            && self.scopes.top().parens == 0
        {
            self.push_frame(FrameKind::InitializerList, String::new(), 0);
            Some(TokenKind::InitializerList)
        } else if matches!(
            self.last_identifier.as_str(),
            "public" | "protected" | "private"
        ) {
            Some(TokenKind::AccessModifier)
        } else {
            None
        }
    }

    fn read_identifier(&mut self) -> TokenKind {
        let input = self.input;
        let start = self.pos;
        while self.peek().is_some_and(is_word) {
            self.pos += 1;
        }
        let word = &input[start..self.pos];

        let (kind, container) = match word {
            b"namespace" => (TokenKind::NamespaceKeyword, FrameKind::Namespace),
            b"class" => (TokenKind::ClassKeyword, FrameKind::Class),
            b"struct" => (TokenKind::StructKeyword, FrameKind::Struct),
            b"enum" => (TokenKind::EnumKeyword, FrameKind::Enum),
            _ => {
                // Identifier bytes are ASCII word characters.
                let word: &str = &String::from_utf8_lossy(word);
                word.clone_into(&mut self.last_identifier);
                if self.container_name.is_empty() {
                    word.clone_into(&mut self.container_name);
                }
                return TokenKind::Identifier;
            }
        };

        // `enum class` and `enum struct` stay enumerations.
        if self.next_container != FrameKind::Enum || container == FrameKind::Namespace {
            self.next_container = container;
        }
        self.container_name.clear();
        kind
    }

    fn skip_number(&mut self) {
        self.pos += 1;
        loop {
            match self.peek() {
                Some(c) if is_word(c) || c == b'.' => self.pos += 1,
                Some(b'\'') if self.peek_at(1).is_some_and(is_word) => self.pos += 2,
                _ => break,
            }
        }
    }

    // ─── Literals ───────────────────────────────────────────────────

    fn read_escape(&mut self) -> Result<(), ScanError> {
        self.pos += 1; // skip backslash
        match ESCAPE.find(&self.input[self.pos..]) {
            Some(m) => {
                self.pos += m.end();
                Ok(())
            }
            None => Err(self.error(ScanErrorKind::MalformedEscape, self.pos)),
        }
    }

    fn read_char_literal(&mut self) -> Result<(), ScanError> {
        self.pos += 1; // skip opening quote

        match self.peek() {
            Some(b'\'') => return Err(self.error(ScanErrorKind::EmptyCharLiteral, self.pos)),
            Some(b'\\') => self.read_escape()?,
            Some(_) => self.pos += char_width(&self.input[self.pos..]),
            None => {}
        }

        if self.peek() != Some(b'\'') {
            return Err(self.error(ScanErrorKind::MissingCharDelimiter, self.pos));
        }
        self.pos += 1;
        Ok(())
    }

    fn read_string(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        let is_raw = start > 0 && self.input[start - 1] == b'R';
        self.pos += 1; // skip opening quote

        if is_raw {
            return self.read_raw_string(start);
        }

        loop {
            let Some(offset) = memchr::memchr3(b'\\', b'"', b'\n', &self.input[self.pos..]) else {
                return Err(self.error(ScanErrorKind::UnterminatedLiteral, start));
            };
            self.pos += offset;
            match self.input[self.pos] {
                b'"' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'\\' => self.read_escape()?,
                _ => return Err(self.error(ScanErrorKind::UnterminatedLiteral, start)),
            }
        }
    }

    /// `R"delim( ... )delim"`, where `delim` is at most 16 characters.
    fn read_raw_string(&mut self, start: usize) -> Result<(), ScanError> {
        let Some(open) = RAW_STRING_OPEN.captures(&self.input[self.pos..]) else {
            return Err(self.error(ScanErrorKind::InvalidRawString, start));
        };
        let delimiter = open.get(1).map_or(&[][..], |m| m.as_bytes());
        let body = self.pos + open.get(0).map_or(0, |m| m.end());

        let mut closing = Vec::with_capacity(delimiter.len() + 2);
        closing.push(b')');
        closing.extend_from_slice(delimiter);
        closing.push(b'"');

        match memchr::memmem::find(&self.input[body..], &closing) {
            Some(offset) => {
                self.pos = body + offset + closing.len();
                Ok(())
            }
            None => Err(self.error(ScanErrorKind::InvalidRawString, start)),
        }
    }

    // ─── Directives and comments ────────────────────────────────────

    /// Consume a preprocessor line, following `\` continuations. A block
    /// comment opened on the line and not closed there is left for
    /// `read_comment`.
    fn read_directive(&mut self) {
        self.pos += 1; // skip '#'

        let mut line_end = self.pos;
        loop {
            line_end += memchr::memchr(b'\n', &self.input[line_end..])
                .unwrap_or(self.input.len() - line_end);
            let content = &self.input[..line_end];
            let continued = content.strip_suffix(b"\r").unwrap_or(content).ends_with(b"\\");
            if continued && line_end < self.input.len() {
                line_end += 1;
            } else {
                break;
            }
        }

        // A block comment still open at the end of the line ends the
        // directive where it starts.
        let line = &self.input[self.pos..line_end];
        let mut from = 0;
        while let Some(open) = memchr::memmem::find(&line[from..], b"/*") {
            let open = from + open;
            match memchr::memmem::find(&line[open + 2..], b"*/") {
                Some(close) => from = open + 2 + close + 2,
                None => {
                    self.pos += open;
                    return;
                }
            }
        }

        self.pos = (line_end + 1).min(self.input.len());
    }

    /// Returns `false` when the `/` does not start a comment.
    fn read_comment(&mut self) -> Result<bool, ScanError> {
        match self.peek_at(1) {
            Some(b'*') => {
                let start = self.pos;
                let Some(close) = memchr::memmem::find(&self.input[start + 2..], b"*/") else {
                    return Err(self.error(ScanErrorKind::UnterminatedComment, start));
                };
                self.pos = start + 2 + close + 2;
                while self.peek().is_some_and(is_space) {
                    self.pos += 1;
                }
                Ok(true)
            }
            Some(b'/') => {
                self.skip_line();
                // Absorb directly following `//` lines.
                loop {
                    let save = self.pos;
                    while self.peek().is_some_and(is_space) {
                        self.pos += 1;
                    }
                    if self.input[self.pos..].starts_with(b"//") {
                        self.skip_line();
                    } else {
                        self.pos = save;
                        break;
                    }
                }
                Ok(true)
            }
            _ => {
                self.pos += 1;
                Ok(false)
            }
        }
    }

    /// Advance to the next newline without consuming it.
    fn skip_line(&mut self) {
        self.pos += memchr::memchr(b'\n', &self.input[self.pos..])
            .unwrap_or(self.input.len() - self.pos);
    }
}

const fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

const fn is_word(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Bytes taken by the character at the start of `rest`: a well-formed UTF-8
/// sequence, otherwise a single byte.
fn char_width(rest: &[u8]) -> usize {
    let expected = match rest.first().copied() {
        Some(0xC0..=0xDF) => 2,
        Some(0xE0..=0xEF) => 3,
        Some(0xF0..=0xF7) => 4,
        _ => return 1,
    };
    let continued = rest
        .iter()
        .skip(1)
        .take(expected - 1)
        .take_while(|&&b| b & 0xC0 == 0x80)
        .count();
    if continued == expected - 1 { expected } else { 1 }
}

fn snippet(input: &[u8], at: usize) -> String {
    let rest = &input[at.min(input.len())..];
    let end = memchr::memchr2(b'\n', 0, rest).unwrap_or(rest.len());
    String::from_utf8_lossy(&rest[..end])
        .trim_end_matches('\r')
        .chars()
        .take(SNIPPET_LEN)
        .collect()
}
