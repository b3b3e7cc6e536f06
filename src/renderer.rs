//! Pluggable template rendering.

use std::io::Write;

use crate::context::ScopedData;

/// Capability interface for a templating engine.
///
/// The framework never renders anything itself.
/// [`Response::html`](crate::Response::html) hands the configured renderer
/// the response body as a sink, the request's merged scoped data, and the
/// template names the controller asked for; everything else is the engine's
/// concern.
pub trait Renderer: Send + Sync {
    /// Turns the named templates plus the given data into output bytes.
    fn render(
        &self,
        out: &mut dyn Write,
        data: &ScopedData,
        templates: &[&str],
    ) -> std::io::Result<()>;
}
