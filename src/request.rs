//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

/// An inbound HTTP request with its body fully collected.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Builds a request by hand, with no headers and an empty body. Useful
    /// for exercising controllers through [`App::dispatch`](crate::App::dispatch)
    /// without a socket.
    ///
    /// # Panics
    ///
    /// Panics if `uri` is not a valid URI.
    pub fn new(method: Method, uri: &str) -> Self {
        let uri: Uri = uri.parse().expect("invalid request uri");
        Self { method, uri, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Adds a header. Panics on an invalid header name or value, which in a
    /// hand-built request is a programming error.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name: HeaderName = name.parse().expect("invalid header name");
        let value: HeaderValue = value.parse().expect("invalid header value");
        self.headers.insert(name, value);
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self { method: parts.method, uri: parts.uri, headers: parts.headers, body }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The raw query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup. Non-UTF-8 header values return `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::new(Method::GET, "/").with_header("X-Token", "abc");

        assert_eq!(req.header("x-token"), Some("abc"));
        assert_eq!(req.header("X-TOKEN"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn path_and_query_come_from_the_uri() {
        let req = Request::new(Method::GET, "/users/42?verbose=1");

        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.query(), Some("verbose=1"));
    }

    #[test]
    fn body_defaults_to_empty() {
        let req = Request::new(Method::POST, "/users");
        assert!(req.body().is_empty());

        let req = req.with_body(br#"{"name":"alice"}"#.to_vec());
        assert_eq!(req.body(), br#"{"name":"alice"}"#);
    }
}
