//! Lookbehind merging of freshly scanned tokens.
//!
//! The scanner appends through a [`TokenWindow`]. Recent tokens stay in a
//! small pending buffer where they can still be coalesced or reclassified;
//! older tokens are committed and never touched again. The window keeps the
//! last two significant (non-trivia) tokens and everything after them
//! pending, which is as far back as any merge rule looks.

use crate::token::{Token, TokenKind};

/// Number of significant tokens kept open for merging.
const LOOKBEHIND: usize = 2;

/// Append-only token sink with a mergeable tail.
#[derive(Debug, Default)]
pub struct TokenWindow {
    committed: Vec<Token>,
    pending: Vec<Token>,
}

impl TokenWindow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent token, significant or not.
    #[must_use]
    pub fn last(&self) -> Option<&Token> {
        self.pending.last().or_else(|| self.committed.last())
    }

    /// Byte offset right after the most recent token.
    #[must_use]
    pub fn end(&self) -> usize {
        self.last().map_or(0, |t| t.span.end)
    }

    /// Most recent token that is not whitespace or a comment.
    #[must_use]
    pub fn last_significant(&self) -> Option<&Token> {
        self.significant_index(0).map(|i| &self.pending[i])
    }

    /// Mutable access to the most recent significant token, for
    /// reclassification while it is still pending.
    pub fn last_significant_mut(&mut self) -> Option<&mut Token> {
        self.significant_index(0).map(|i| &mut self.pending[i])
    }

    /// Extend the most recent token so it ends at `end`.
    pub fn extend_last(&mut self, end: usize) -> bool {
        match self.pending.last_mut() {
            Some(last) => {
                last.span.end = end;
                true
            }
            None => false,
        }
    }

    /// Append `token`, coalescing it with earlier pending tokens when one of
    /// the merge rules applies.
    pub fn push(&mut self, token: Token) {
        match self.merge_target(token.kind) {
            Some(target) => {
                // Trivia between the target and the new token is absorbed.
                self.pending.truncate(target + 1);
                let merged = &mut self.pending[target];
                merged.span.end = token.span.end;
                merged.kind = token.kind;
            }
            None => self.pending.push(token),
        }
        self.commit_settled();
    }

    /// Commit everything and append the end-of-file sentinel.
    #[must_use]
    pub fn finish(mut self, source_len: usize) -> Vec<Token> {
        self.committed.append(&mut self.pending);
        self.committed
            .push(Token::new(TokenKind::Eof, source_len, source_len));
        self.committed
    }

    fn merge_target(&self, kind: TokenKind) -> Option<usize> {
        match kind {
            TokenKind::BeginGroup => {
                let last = self.pending.len().checked_sub(1)?;
                (self.pending[last].kind == TokenKind::Empty).then_some(last)
            }
            TokenKind::Identifier => {
                let scope = self.significant_index(0)?;
                if self.pending[scope].kind != TokenKind::ScopeResolution {
                    return None;
                }
                match self.significant_index(1) {
                    Some(qualifier) if self.pending[qualifier].kind == TokenKind::Identifier => {
                        Some(qualifier)
                    }
                    _ => Some(scope),
                }
            }
            TokenKind::AccessModifier => self.significant_of_kind(TokenKind::Identifier),
            TokenKind::InitializerList => self.significant_of_kind(TokenKind::InitializerList),
            _ => None,
        }
    }

    fn significant_of_kind(&self, kind: TokenKind) -> Option<usize> {
        self.significant_index(0)
            .filter(|&i| self.pending[i].kind == kind)
    }

    /// Index in `pending` of the `nth` significant token counting back from
    /// the end.
    fn significant_index(&self, nth: usize) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, t)| !t.kind.is_trivia())
            .nth(nth)
            .map(|(i, _)| i)
    }

    fn commit_settled(&mut self) {
        let mut significant = self
            .pending
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .count();
        let mut settled = 0;
        for token in &self.pending {
            if significant <= LOOKBEHIND {
                break;
            }
            if !token.kind.is_trivia() {
                significant -= 1;
            }
            settled += 1;
        }
        self.committed.extend(self.pending.drain(..settled));
    }
}
