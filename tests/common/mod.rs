#![allow(dead_code)]

use cppx_split::{SplitOptions, SplitOutput, Token, TokenKind, convert_str, scan};

/// Scan `source` and pair every token with its text.
pub fn tokens_of(source: &str) -> Vec<(TokenKind, String)> {
    scan(source)
        .unwrap_or_else(|e| panic!("scan failed: {e}\n--- source ---\n{source}"))
        .iter()
        .map(|t| (t.kind, t.text(source).to_string()))
        .collect()
}

/// Kind of the first token whose text is exactly `text`.
pub fn kind_of(tokens: &[(TokenKind, String)], text: &str) -> TokenKind {
    tokens
        .iter()
        .find(|(_, t)| t == text)
        .map(|(k, _)| *k)
        .unwrap_or_else(|| panic!("no token {text:?} in {tokens:#?}"))
}

/// Concatenate the text of every token.
pub fn rebuild(source: &str, tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text(source)).collect()
}

/// Assert that the stream covers the source without gaps or overlaps and
/// ends with the sentinel.
pub fn assert_lossless(source: &str, tokens: &[Token]) {
    let mut offset = 0;
    for token in tokens {
        assert_eq!(
            token.span.start, offset,
            "gap or overlap before {token:?}\n--- source ---\n{source}"
        );
        assert!(token.span.end >= token.span.start);
        offset = token.span.end;
    }
    assert_eq!(offset, source.len());
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    assert_eq!(rebuild(source, tokens), source);
}

/// Convert with default options for the given file stem.
pub fn split_str(source: &str, base_name: &str) -> SplitOutput {
    convert_str(source, &SplitOptions::new(base_name))
        .unwrap_or_else(|e| panic!("conversion failed: {e}\n--- source ---\n{source}"))
}
