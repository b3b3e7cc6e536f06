//! Outgoing HTTP response type and its content-typed write helpers.
//!
//! A [`Response`] buffers status, headers, and body while the middleware
//! chain runs; the server converts it to a wire response once dispatch is
//! done. Buffering means a later step in the chain (a panic handler, an
//! aborting middleware) can still change the status line, which a streamed
//! response could not.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::debug;

use crate::context::{Context, ScopedData};
use crate::error::Error;
use crate::renderer::Renderer;
use crate::static_files::{content_type_for, FileSystem};

/// An outgoing HTTP response.
///
/// Controllers and middlewares receive `&mut Response` and use the typed
/// helpers:
///
/// ```rust
/// use vega::{Context, Response, StatusCode};
///
/// fn show(ctx: &mut Context<'_>, res: &mut Response) {
///     match ctx.param("id") {
///         Some(id) => res.text(format!("user {id}")),
///         None => res.set_status(StatusCode::NOT_FOUND),
///     }
/// }
/// # vega::controller(show);
/// ```
///
/// The body helpers take bytes; how you build them is your business:
/// `serde_json::to_vec(&user)` and `format!(...).into_bytes()` are equally
/// welcome.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    renderer: Option<Arc<dyn Renderer>>,
}

impl Response {
    /// An empty `200 OK` response, ready to be written to.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            renderer: None,
        }
    }

    /// Replaces the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets a header, replacing any previous value. Invalid names or values
    /// are dropped with a debug log rather than corrupting the response.
    pub fn header(&mut self, name: &str, value: &str) {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => debug!(header = name, "dropping invalid response header"),
        }
    }

    /// Header lookup. Non-UTF-8 values return `None`.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The buffered body written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Configures the renderer used by [`html`](Response::html). Typically
    /// done by an early middleware so every route on the router can render.
    pub fn set_renderer(&mut self, renderer: Arc<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    /// Writes a plain-text body and sets `Content-Type: text/plain`.
    ///
    /// Repeated calls append to the body.
    pub fn text(&mut self, body: impl AsRef<str>) {
        self.header("Content-Type", "text/plain");
        self.body.extend_from_slice(body.as_ref().as_bytes());
    }

    /// Renders templates to the body and sets `Content-Type: text/html`.
    ///
    /// `data` is merged into the context's request-scoped store first, so
    /// values placed there by middlewares and values passed here reach the
    /// renderer in one map, and later chain steps see the merged state.
    ///
    /// Fails with [`Error::MissingRenderer`] if no renderer is configured.
    pub fn html(
        &mut self,
        ctx: &mut Context<'_>,
        data: ScopedData,
        templates: &[&str],
    ) -> Result<(), Error> {
        for (key, value) in data {
            ctx.set_any(key, value);
        }
        self.header("Content-Type", "text/html");
        let renderer = self.renderer.as_ref().ok_or(Error::MissingRenderer)?;
        renderer.render(&mut self.body, ctx.data(), templates).map_err(Error::Render)
    }

    /// Writes a caller-encoded JSON body and sets
    /// `Content-Type: application/json`.
    pub fn json(&mut self, body: Vec<u8>) {
        self.header("Content-Type", "application/json");
        self.body.extend_from_slice(&body);
    }

    /// Writes a caller-encoded XML body and sets `Content-Type: text/xml`.
    pub fn xml(&mut self, body: Vec<u8>) {
        self.header("Content-Type", "text/xml");
        self.body.extend_from_slice(&body);
    }

    /// Serves one file through the given [`FileSystem`]. The content type
    /// is guessed from the file extension; a file the collaborator cannot
    /// open becomes a 404.
    pub fn static_file(&mut self, fs: &dyn FileSystem, name: &str) {
        match fs.open(name) {
            Ok(bytes) => {
                self.header("Content-Type", content_type_for(name));
                self.body.extend_from_slice(&bytes);
            }
            Err(e) => {
                debug!(file = name, "static file not served: {e}");
                self.set_status(StatusCode::NOT_FOUND);
            }
        }
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
