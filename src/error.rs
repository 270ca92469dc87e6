use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the controller.
///
/// Only target opens are fatal, since without a writable target no more data
/// can be accepted. Symlink upkeep, retired-file closes, compression, and
/// post-compression deletion are all best-effort: their failures are logged
/// at `warn` and swallowed, and never appear in a `Result`.
#[derive(Debug, Error)]
pub enum Error {
    /// The new active target (or its parent directory chain) could not be
    /// opened for append.
    #[error("failed to open log target {}", path.display())]
    Open {
        /// The resolved path that could not be opened.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The working-directory anchor could not be determined at construction.
    #[error("failed to resolve working directory")]
    WorkingDir(#[source] io::Error),
}
