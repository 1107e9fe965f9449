//! Discovery of extended sources and conversion of single files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::options::{HEADER_EXTENSION, INPUT_EXTENSION, SOURCE_EXTENSION, SplitOptions};
use crate::splitter::SplitBytes;
use crate::{Error, convert_bytes};

/// File extensions for inputs and the two generated siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub input_extension: String,
    pub header_extension: String,
    pub source_extension: String,
}

impl Layout {
    #[must_use]
    pub fn new(input: &str, header: &str, source: &str) -> Self {
        Self {
            input_extension: input.trim_start_matches('.').to_string(),
            header_extension: header.trim_start_matches('.').to_string(),
            source_extension: source.trim_start_matches('.').to_string(),
        }
    }

    /// Whether `path` carries the input extension.
    #[must_use]
    pub fn is_input(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.to_string_lossy() == self.input_extension)
    }

    /// Header and implementation paths generated for `input`.
    #[must_use]
    pub fn outputs(&self, input: &Path) -> (PathBuf, PathBuf) {
        (
            input.with_extension(&self.header_extension),
            input.with_extension(&self.source_extension),
        )
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(INPUT_EXTENSION, HEADER_EXTENSION, SOURCE_EXTENSION)
    }
}

/// A discovered input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Size in bytes, when the file system reported one.
    pub size: Option<u64>,
}

/// Result of walking a directory tree. Entries that could not be read are
/// collected instead of stopping the walk.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<SourceFile>,
    pub errors: Vec<walkdir::Error>,
}

/// Recursively collect regular files under `root` with the input extension,
/// sorted by path.
#[must_use]
pub fn discover(root: &Path, layout: &Layout) -> Discovery {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && layout.is_input(entry.path()) {
                    let size = entry.metadata().ok().map(|m| m.len());
                    discovery.files.push(SourceFile {
                        path: entry.into_path(),
                        size,
                    });
                }
            }
            Err(e) => discovery.errors.push(e),
        }
    }

    debug!(
        root = %root.display(),
        files = discovery.files.len(),
        errors = discovery.errors.len(),
        "discovered sources"
    );
    discovery
}

/// Outcome of converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub header: PathBuf,
    pub implementation: PathBuf,
    pub output: SplitBytes,
}

/// Convert one source and, when `write` is set, write both siblings next to
/// it. The source is read as bytes, so any encoding that keeps C++ syntax in
/// ASCII converts.
///
/// # Errors
///
/// Returns `Error::Io` when the source cannot be read or an output cannot
/// be written, and `Error::Scan`/`Error::Split` when conversion fails. A
/// failure while writing may leave the first output on disk.
pub fn convert_file(
    path: &Path,
    layout: &Layout,
    include_header: bool,
    write: bool,
) -> Result<Converted, Error> {
    let source = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let base_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let options = SplitOptions::new(&base_name)
        .header_extension(&layout.header_extension)
        .include_header(include_header);

    let output = convert_bytes(&source, &options)?;
    let (header, implementation) = layout.outputs(path);

    if write {
        write_output(&header, &output.declarations)?;
        write_output(&implementation, &output.definitions)?;
    }

    Ok(Converted {
        header,
        implementation,
        output,
    })
}

fn write_output(path: &Path, contents: &[u8]) -> Result<(), Error> {
    fs::write(path, contents).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
