use std::path::PathBuf;

use thiserror::Error;

use crate::xml::XmlError;

/// Failure of a session operation that cannot be recovered by a fallback.
///
/// Problems inside documents are never returned; they go to the session's
/// [`Diagnostics`](crate::Diagnostics).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),
}
