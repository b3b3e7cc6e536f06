//! Background services started at application boot.

use std::future::Future;
use std::pin::Pin;

/// A heap-allocated, type-erased future. `Send + 'static` so tokio can move
/// it across worker threads; implementors clone whatever state the task
/// needs before returning it.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A long-lived background task, one per registered name, started by
/// [`App::start_services`](crate::App::start_services) when the application
/// boots.
///
/// Services are fire-and-forget: nothing joins, restarts, or observes them
/// after spawn. A service that needs to talk to request handlers should do
/// so through channels or application-scoped data.
pub trait Service: Send + Sync + 'static {
    /// Returns the service's main future. Called once at startup.
    fn run(&self) -> BoxFuture;
}
