//! Per-file settings for the splitter.

/// Default extension of extended sources.
pub const INPUT_EXTENSION: &str = "cppx";
/// Default extension of generated interface files.
pub const HEADER_EXTENSION: &str = "h";
/// Default extension of generated implementation files.
pub const SOURCE_EXTENSION: &str = "cpp";

/// Options controlling how one source is split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// File stem used for the include guard and the header include.
    pub base_name: String,
    /// Extension of the header named by the definition-side include.
    pub header_extension: String,
    /// Emit `#include "<base>.<header>"` at the top of the definitions.
    pub include_header: bool,
    /// Wrap the declarations in `#ifndef`/`#define`/`#endif`.
    pub include_guard: bool,
}

impl SplitOptions {
    /// Create options for a file with the given stem.
    #[must_use]
    pub fn new(base_name: &str) -> Self {
        Self {
            base_name: base_name.to_string(),
            header_extension: HEADER_EXTENSION.to_string(),
            include_header: true,
            include_guard: true,
        }
    }

    /// Set the extension used in the definition-side include.
    #[must_use]
    pub fn header_extension(mut self, ext: &str) -> Self {
        ext.trim_start_matches('.')
            .clone_into(&mut self.header_extension);
        self
    }

    /// Enable or disable the definition-side header include.
    #[must_use]
    pub const fn include_header(mut self, enabled: bool) -> Self {
        self.include_header = enabled;
        self
    }

    /// Enable or disable the include guard around the declarations.
    #[must_use]
    pub const fn include_guard(mut self, enabled: bool) -> Self {
        self.include_guard = enabled;
        self
    }

    /// File name of the generated header, e.g. `widget.h`.
    #[must_use]
    pub fn header_file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.header_extension)
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::new("output")
    }
}
