//! Second pass: replays a token stream into declaration and definition
//! streams.
//!
//! Inline function bodies are moved to the definition stream with the
//! enclosing namespace and type names prepended to the function name; the
//! declaration stream keeps everything else and receives a `;` in place of
//! each moved body.
//!
//! The streams are built from source bytes, so text that is not valid UTF-8
//! (a Latin-1 comment, say) is carried through unchanged.

use std::fmt;
use std::io::Write as _;

use tracing::debug;

use crate::lexer::BOM;
use crate::options::SplitOptions;
use crate::scope::ScopeStack;
use crate::token::{Position, Token, TokenKind};

/// Classifies a splitter error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitErrorKind {
    /// `}` closing a region that was never opened.
    UnbalancedBrace,
}

impl fmt::Display for SplitErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedBrace => write!(f, "'}}' does not close any open region"),
        }
    }
}

/// Error produced while splitting a token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct SplitError {
    pub kind: SplitErrorKind,
    pub position: Position,
}

/// The two generated streams for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    /// Interface file contents.
    pub declarations: String,
    /// Implementation file contents.
    pub definitions: String,
    /// Include guard identifier, e.g. `A_B_WIDGET_H`.
    pub include_guard: String,
}

/// [`SplitOutput`] over raw bytes, as written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBytes {
    pub declarations: Vec<u8>,
    pub definitions: Vec<u8>,
    pub include_guard: String,
}

impl From<SplitBytes> for SplitOutput {
    fn from(out: SplitBytes) -> Self {
        Self {
            declarations: into_string(out.declarations),
            definitions: into_string(out.definitions),
            include_guard: out.include_guard,
        }
    }
}

/// Token boundaries fall on ASCII bytes, so streams built from a UTF-8
/// source are UTF-8 as well.
fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Split a scanned source into declarations and definitions.
///
/// `tokens` must be the stream produced by [`scan`](crate::scan) for
/// `source`.
///
/// # Errors
///
/// Returns `SplitError` when the stream closes a region that was never
/// opened, e.g. a `}` whose `{` was folded into a parameter list as in
/// `({)}`.
pub fn split(
    source: &str,
    tokens: &[Token],
    options: &SplitOptions,
) -> Result<SplitOutput, SplitError> {
    split_bytes(source.as_bytes(), tokens, options).map(SplitOutput::from)
}

/// Byte form of [`split`], for streams from [`scan_bytes`](crate::scan_bytes).
///
/// # Errors
///
/// Same as [`split`].
pub fn split_bytes(
    source: &[u8],
    tokens: &[Token],
    options: &SplitOptions,
) -> Result<SplitBytes, SplitError> {
    Splitter::new(source, options).split(tokens)
}

/// Build an include guard from the namespaces seen before the first type and
/// the file stem: `["a", "b"]` + `x` gives `A_B_X_H`.
#[must_use]
pub fn include_guard_name(namespaces: &[String], base_name: &str) -> String {
    let mut guard = String::new();
    for namespace in namespaces {
        guard.push_str(&namespace.replace("::", "_"));
        guard.push('_');
    }
    guard.push_str(base_name);
    guard.push_str("_H");
    guard
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    None,
    Namespace,
    Class,
    Struct,
    Enum,
    Function,
}

impl Region {
    const fn of_keyword(kind: TokenKind) -> Self {
        match kind {
            TokenKind::NamespaceKeyword => Self::Namespace,
            TokenKind::ClassKeyword => Self::Class,
            TokenKind::StructKeyword => Self::Struct,
            TokenKind::EnumKeyword => Self::Enum,
            _ => Self::None,
        }
    }
}

/// Text being collected until a control token decides where it goes.
#[derive(Debug)]
enum Capture {
    Idle,
    Container {
        region: Region,
        text: Vec<u8>,
        name: Option<String>,
        /// `using namespace x;` names no enclosing namespace.
        using: bool,
    },
    Signature {
        text: Vec<u8>,
    },
}

struct Splitter<'a> {
    source: &'a [u8],
    options: &'a SplitOptions,
    scopes: ScopeStack<Region>,
    capture: Capture,
    /// Text since the last routed token.
    pending: Vec<u8>,
    bom: bool,
    banner: Vec<u8>,
    declarations: Vec<u8>,
    definitions: Vec<u8>,
    guard_namespaces: Vec<String>,
    guard_sealed: bool,
    after_using: bool,
    moved_bodies: usize,
}

impl<'a> Splitter<'a> {
    fn new(source: &'a [u8], options: &'a SplitOptions) -> Self {
        Self {
            source,
            options,
            scopes: ScopeStack::new(Region::None),
            capture: Capture::Idle,
            pending: Vec::new(),
            bom: false,
            banner: Vec::new(),
            declarations: Vec::new(),
            definitions: Vec::new(),
            guard_namespaces: Vec::new(),
            guard_sealed: false,
            after_using: false,
            moved_bodies: 0,
        }
    }

    fn split(mut self, tokens: &[Token]) -> Result<SplitBytes, SplitError> {
        let mut rest = tokens;
        if let Some((first, tail)) = rest.split_first() {
            if first.kind == TokenKind::Passthrough && first.bytes(self.source) == BOM {
                self.bom = true;
                rest = tail;
            }
        }
        if let Some((first, tail)) = rest.split_first() {
            if first.kind == TokenKind::Comment {
                self.banner = first.bytes(self.source).to_vec();
                rest = tail;
            }
        }

        for token in rest {
            self.feed(token)?;
        }
        self.flush_capture();
        let pending = std::mem::take(&mut self.pending);
        self.declarations.extend_from_slice(&pending);

        Ok(self.finish())
    }

    fn feed(&mut self, token: &Token) -> Result<(), SplitError> {
        let text = token.bytes(self.source);
        let follows_using = self.after_using;
        if !token.kind.is_trivia() {
            self.after_using = token.kind == TokenKind::Identifier && text == b"using";
        }

        if self.scopes.kind() == Region::Function {
            return self.feed_body(token, text);
        }

        match self.capture {
            Capture::Container { .. } => return self.feed_container(token, text),
            Capture::Signature { .. } => return self.feed_signature(token, text),
            Capture::Idle => {}
        }

        match token.kind {
            kind if kind.is_container_keyword() => {
                let region = Region::of_keyword(kind);
                self.seal_guard(region);
                self.capture = Capture::Container {
                    region,
                    text: text.to_vec(),
                    name: None,
                    using: follows_using,
                };
            }
            TokenKind::FunctionName | TokenKind::ConstructorDestructor => {
                self.start_signature(token.kind, text);
            }
            TokenKind::Directive | TokenKind::AccessModifier | TokenKind::StatementTerminator => {
                self.declare(text);
            }
            TokenKind::BeginGroup => {
                self.declare(text);
                self.scopes.open_brace();
            }
            TokenKind::EndGroup => {
                self.declare(text);
                self.close_region(token)?;
            }
            _ => self.pending.extend_from_slice(text),
        }
        Ok(())
    }

    /// Tokens inside a moved function body go to the definitions verbatim.
    fn feed_body(&mut self, token: &Token, text: &[u8]) -> Result<(), SplitError> {
        self.definitions.extend_from_slice(text);
        match token.kind {
            TokenKind::BeginGroup => self.scopes.open_brace(),
            TokenKind::EndGroup => self.close_region(token)?,
            _ => {}
        }
        Ok(())
    }

    fn feed_container(&mut self, token: &Token, text: &[u8]) -> Result<(), SplitError> {
        match token.kind {
            TokenKind::BeginGroup => {
                let (region, name) = self.take_container(text);
                self.scopes.push(region, name, 1);
            }
            TokenKind::StatementTerminator => {
                // Forward declaration, alias or using-directive: no region
                // opens.
                self.take_container(text);
            }
            TokenKind::EndGroup => {
                self.flush_capture();
                self.declare(text);
                self.close_region(token)?;
            }
            kind if kind.is_container_keyword() => {
                let region = Region::of_keyword(kind);
                self.seal_guard(region);
                if let Capture::Container {
                    region: current,
                    text: buffered,
                    name,
                    ..
                } = &mut self.capture
                {
                    buffered.extend_from_slice(text);
                    if *current != Region::Enum {
                        *current = region;
                        *name = None;
                    }
                }
            }
            TokenKind::Identifier => {
                let guard_open = !self.guard_sealed;
                if let Capture::Container {
                    region,
                    text: buffered,
                    name,
                    using,
                } = &mut self.capture
                {
                    buffered.extend_from_slice(text);
                    if name.is_none() {
                        let cleaned: Vec<u8> = text
                            .iter()
                            .copied()
                            .filter(|b| !b.is_ascii_whitespace())
                            .collect();
                        let cleaned = String::from_utf8_lossy(&cleaned).into_owned();
                        if *region == Region::Namespace && guard_open && !*using {
                            self.guard_namespaces.push(cleaned.clone());
                        }
                        *name = Some(cleaned);
                    }
                }
            }
            _ => {
                if let Capture::Container { text: buffered, .. } = &mut self.capture {
                    buffered.extend_from_slice(text);
                }
            }
        }
        Ok(())
    }

    fn feed_signature(&mut self, token: &Token, text: &[u8]) -> Result<(), SplitError> {
        match token.kind {
            TokenKind::BeginGroup => self.move_body(text, 1),
            TokenKind::InitializerList => self.move_body(text, 0),
            TokenKind::StatementTerminator => {
                // Prototype only.
                self.flush_capture();
                self.declare(text);
            }
            TokenKind::EndGroup => {
                self.flush_capture();
                self.declare(text);
                self.close_region(token)?;
            }
            _ => {
                if let Capture::Signature { text: buffered } = &mut self.capture {
                    buffered.extend_from_slice(text);
                }
            }
        }
        Ok(())
    }

    fn start_signature(&mut self, kind: TokenKind, text: &[u8]) {
        let mut signature = Vec::new();
        if kind == TokenKind::ConstructorDestructor {
            // Keep a destructor's `~` next to its name so qualification
            // lands in front of it.
            let trimmed = self.pending.trim_ascii_end();
            if trimmed.ends_with(b"~") {
                signature = self.pending.split_off(trimmed.len() - 1);
            }
        }
        signature.extend_from_slice(text);
        self.capture = Capture::Signature { text: signature };
    }

    /// Route a captured signature to both streams and start copying the body
    /// that follows into the definitions.
    fn move_body(&mut self, opening: &[u8], braces: usize) {
        let Capture::Signature { text: signature } =
            std::mem::replace(&mut self.capture, Capture::Idle)
        else {
            return;
        };
        let leading = std::mem::take(&mut self.pending);
        let prefix = self.qualification();

        self.declarations.extend_from_slice(&leading);
        self.declarations.extend_from_slice(signature.trim_ascii_end());
        self.declarations.push(b';');

        if !self.definitions.is_empty() && !self.definitions.ends_with(b"\n\n") {
            self.definitions.push(b'\n');
        }
        self.definitions.extend_from_slice(leading.trim_ascii_start());
        self.definitions.extend_from_slice(&prefix);
        self.definitions.extend_from_slice(&signature);
        self.definitions.extend_from_slice(opening);

        self.scopes.push(Region::Function, String::new(), braces);
        self.moved_bodies += 1;
    }

    /// `A::B::` for the enclosing named namespaces and types.
    fn qualification(&self) -> Vec<u8> {
        self.scopes
            .frames()
            .filter(|f| f.kind != Region::Function && !f.name.is_empty())
            .fold(Vec::new(), |mut prefix, f| {
                prefix.extend_from_slice(f.name.as_bytes());
                prefix.extend_from_slice(b"::");
                prefix
            })
    }

    /// Finish a container capture, sending its text to the declarations.
    fn take_container(&mut self, terminator: &[u8]) -> (Region, String) {
        let Capture::Container {
            region, text, name, ..
        } = std::mem::replace(&mut self.capture, Capture::Idle)
        else {
            return (Region::None, String::new());
        };
        let leading = std::mem::take(&mut self.pending);
        self.declarations.extend_from_slice(&leading);
        self.declarations.extend_from_slice(&text);
        self.declarations.extend_from_slice(terminator);
        (region, name.unwrap_or_default())
    }

    /// Abandon any capture, sending what it collected to the declarations.
    fn flush_capture(&mut self) {
        let collected = match std::mem::replace(&mut self.capture, Capture::Idle) {
            Capture::Idle => return,
            Capture::Container { text, .. } | Capture::Signature { text } => text,
        };
        self.pending.extend_from_slice(&collected);
    }

    /// Send pending text plus `text` to the declarations.
    fn declare(&mut self, text: &[u8]) {
        let leading = std::mem::take(&mut self.pending);
        self.declarations.extend_from_slice(&leading);
        self.declarations.extend_from_slice(text);
    }

    fn close_region(&mut self, token: &Token) -> Result<(), SplitError> {
        let left = self.scopes.close_brace().map_err(|_| SplitError {
            kind: SplitErrorKind::UnbalancedBrace,
            position: Position::of_offset(self.source, token.span.start),
        })?;
        if left == 0 {
            if self.scopes.kind() == Region::Function {
                self.definitions.push(b'\n');
            }
            self.scopes.pop();
        }
        Ok(())
    }

    fn seal_guard(&mut self, region: Region) {
        if region != Region::Namespace {
            self.guard_sealed = true;
        }
    }

    fn finish(self) -> SplitBytes {
        let guard = include_guard_name(&self.guard_namespaces, &self.options.base_name);

        // A byte order mark stays at the very start of both files.
        let mut preamble = Vec::new();
        if self.bom {
            preamble.extend_from_slice(BOM);
        }
        preamble.extend_from_slice(&self.banner);
        if !self.banner.is_empty() && !self.banner.ends_with(b"\n") {
            preamble.push(b'\n');
        }

        let mut declarations = preamble.clone();
        if self.options.include_guard {
            let _ = writeln!(declarations, "#ifndef {guard}\n#define {guard}");
        }
        declarations.extend_from_slice(&self.declarations);
        if !declarations.ends_with(b"\n") {
            declarations.push(b'\n');
        }
        if self.options.include_guard {
            let _ = writeln!(declarations, "#endif // {guard}");
        }

        let mut definitions = preamble;
        if self.options.include_header {
            let _ = writeln!(
                definitions,
                "#include \"{}\"",
                self.options.header_file_name()
            );
        }
        if !self.definitions.is_empty() {
            if !definitions.is_empty() && !definitions.ends_with(b"\n\n") {
                definitions.push(b'\n');
            }
            definitions.extend_from_slice(&self.definitions);
            if !definitions.ends_with(b"\n") {
                definitions.push(b'\n');
            }
        }

        debug!(
            guard = %guard,
            moved_bodies = self.moved_bodies,
            bom = self.bom,
            "split source"
        );

        SplitBytes {
            declarations,
            definitions,
            include_guard: guard,
        }
    }
}
