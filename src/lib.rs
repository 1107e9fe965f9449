//! Splits extended C++ sources into interface and implementation files.
//!
//! An extended source (`.cppx`) is ordinary C++ whose classes may carry
//! method bodies inline. Conversion runs in two passes: a scope-aware
//! scanner classifies the source into a lossless token stream, and a
//! splitter replays that stream into a declaration stream (the header) and
//! a definition stream (the implementation) with every moved body
//! qualified by its enclosing namespaces and types.
//!
//! # Quick start
//!
//! ```
//! use cppx_split::{SplitOptions, convert_str};
//!
//! let source = "namespace N { class C { int f() { return 1; } }; }\n";
//! let out = convert_str(source, &SplitOptions::new("c")).unwrap();
//! assert!(out.declarations.contains("int f();"));
//! assert!(out.definitions.contains("int N::C::f() { return 1; }"));
//! assert_eq!(out.include_guard, "N_C_H");
//! ```
//!
//! The token stream is available on its own:
//!
//! ```
//! use cppx_split::{TokenKind, scan};
//!
//! let source = "class B { B() : x(1) {} int x; };";
//! let tokens = scan(source).unwrap();
//! let rebuilt: String = tokens.iter().map(|t| t.text(source)).collect();
//! assert_eq!(rebuilt, source);
//! assert!(tokens.iter().any(|t| t.kind == TokenKind::ConstructorDestructor));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use std::path::PathBuf;

pub mod files;
pub mod lexer;
pub mod merge;
pub mod options;
pub mod scope;
pub mod splitter;
pub mod token;

pub use files::{Converted, Discovery, Layout, SourceFile, convert_file, discover};
pub use lexer::{BOM, FrameKind, ScanError, ScanErrorKind, scan, scan_bytes};
pub use options::SplitOptions;
pub use splitter::{
    SplitBytes, SplitError, SplitErrorKind, SplitOutput, include_guard_name, split, split_bytes,
};
pub use token::{Position, Span, Token, TokenKind};

/// Unified error type covering scanning, splitting and file access.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A scanner error.
    #[error("{0}")]
    Scan(#[from] ScanError),
    /// A splitter error.
    #[error("{0}")]
    Split(#[from] SplitError),
    /// Reading a source or writing an output failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scan and split a source string in one step.
pub fn convert_str(source: &str, options: &SplitOptions) -> Result<SplitOutput, Error> {
    let tokens = scan(source)?;
    Ok(split(source, &tokens, options)?)
}

/// Scan and split raw source bytes in one step. Bytes that are not UTF-8
/// are copied to the outputs unchanged.
pub fn convert_bytes(source: &[u8], options: &SplitOptions) -> Result<SplitBytes, Error> {
    let tokens = scan_bytes(source)?;
    Ok(split_bytes(source, &tokens, options)?)
}
