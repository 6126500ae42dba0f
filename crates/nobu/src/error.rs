//! Error types for request handling.
//!
//! Every variant is detected where it occurs and carried back to the HTTP
//! layer, which turns it into a non-2xx response via [`Error::status_code`].
//! No variant is fatal to the server process.

use std::path::PathBuf;

use crate::runtime::RuntimeError;
use crate::sfc::{CompileError, ParseError};

/// Errors produced while answering a single request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested file does not exist on disk
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A bare module's package directory has no package.json
    #[error("No package.json for '{package}' at {}", .path.display())]
    ManifestNotFound {
        /// Package name taken from the request
        package: String,
        /// Where the manifest was expected
        path: PathBuf,
    },

    /// The package.json exists but declares no ES module entry
    #[error("Package '{package}' declares no \"module\" entry in {}", .path.display())]
    ManifestFieldMissing {
        /// Package name taken from the request
        package: String,
        /// Manifest that was read
        path: PathBuf,
    },

    /// The package.json could not be parsed
    #[error("Invalid package.json for '{package}': {reason}")]
    InvalidManifest {
        /// Package name taken from the request
        package: String,
        /// Parser message
        reason: String,
    },

    /// The component source is not a well-formed single-file component
    #[error("Failed to parse component {path}: {source}")]
    ComponentParseFailure {
        /// Request path of the component
        path: String,
        #[source]
        source: ParseError,
    },

    /// The component template failed to compile
    #[error("Failed to compile template of {path}: {source}")]
    TemplateCompileFailure {
        /// Request path of the component
        path: String,
        #[source]
        source: CompileError,
    },

    /// A sub-resource was requested for a block the component doesn't have
    #[error("Component {path} has no <{section}> block")]
    MissingSection {
        /// Request path of the component
        path: String,
        /// Block name (template or style)
        section: &'static str,
    },

    /// The `type` query parameter names no known component section
    #[error("Unknown component section type '{0}' (expected 'template' or 'style')")]
    UnknownSectionType(String),

    /// The URL matches none of the routing patterns
    #[error("No route matches {0}")]
    UnroutableRequest(String),

    /// An untrusted path segment tried to leave its base directory
    #[error("Path escapes the serving root: {0}")]
    PathTraversal(String),

    /// A text source file is not valid UTF-8
    #[error("File is not valid UTF-8: {}", .0.display())]
    InvalidUtf8(PathBuf),

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// HTTP status code this error should be answered with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::FileNotFound(_)
            | Error::ManifestNotFound { .. }
            | Error::MissingSection { .. }
            | Error::UnroutableRequest(_) => 404,
            Error::PathTraversal(_) => 403,
            Error::UnknownSectionType(_) => 400,
            Error::ManifestFieldMissing { .. }
            | Error::InvalidManifest { .. }
            | Error::ComponentParseFailure { .. }
            | Error::TemplateCompileFailure { .. }
            | Error::InvalidUtf8(_)
            | Error::Io(_) => 500,
        }
    }

    /// Whether the error is the client's fault rather than the project's.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::FileNotFound(path) => Error::FileNotFound(path),
            RuntimeError::Io(message) | RuntimeError::Other(message) => Error::Io(message),
        }
    }
}

/// Result type alias using [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
