//! Unified error type.

use std::fmt;

/// The error type returned by vega's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP status
/// codes on the [`Response`](crate::Response), not as `Error`s. This type
/// surfaces infrastructure failures: binding to a port, accepting a
/// connection, or rendering a template without a configured renderer.
#[derive(Debug)]
pub enum Error {
    /// Binding, accepting, or another I/O failure in the server.
    Io(std::io::Error),
    /// [`Response::html`](crate::Response::html) was called but no
    /// [`Renderer`](crate::Renderer) has been configured on the response.
    MissingRenderer,
    /// The configured renderer failed while writing to the response body.
    Render(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::MissingRenderer => write!(f, "no renderer configured"),
            Self::Render(e) => write!(f, "render: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::Render(e) => Some(e),
            Self::MissingRenderer => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
