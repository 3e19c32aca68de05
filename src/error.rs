use std::io;
use std::path::PathBuf;

use crate::lock::LockError;
use crate::parser::ParseError;
use crate::template::TemplateError;

/// Failures that abort a scaffold run.
///
/// An artifact whose target already exists is not an error: it is reported as
/// skipped and its siblings are still written. Route-file failures are kept
/// in the report for the same reason.
#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error("Invalid model name `{0}`: expected a PascalCase identifier such as `BlogPost`")]
    InvalidModelName(String),
    #[error("Invalid field spec: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Lock(#[from] LockError),
    /// `written` holds the files created before the failure, relative to the
    /// project directory. They are not rolled back.
    #[error("Failed to write {}: {source} ({} file(s) written earlier were left in place)", .path.display(), .written.len())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
        written: Vec<PathBuf>,
    },
}
