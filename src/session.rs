//! Pluggable session storage.

use std::any::Any;

/// Capability interface for a session store preserving state across the
/// requests of one client.
///
/// The framework only carries the session on the
/// [`Context`](crate::Context); a middleware is expected to load it from
/// whatever backing store the application uses and attach it via
/// [`Context::set_session`](crate::Context::set_session).
pub trait Session: Send {
    /// Returns a stored value identified by the given key.
    fn get(&self, key: &str) -> Option<&(dyn Any + Send)>;

    /// Stores the given key/value pair.
    fn set(&mut self, key: &str, value: Box<dyn Any + Send>);

    /// Returns a flash value identified by the given key.
    ///
    /// Flash values are stored for exactly one following request; enforcing
    /// that lifetime is the implementation's contract.
    fn flash(&mut self, key: &str) -> Option<Box<dyn Any + Send>>;

    /// Stores a key/value pair visible only to the next request.
    fn set_flash(&mut self, key: &str, value: Box<dyn Any + Send>);
}
