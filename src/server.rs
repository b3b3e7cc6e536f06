//! HTTP server and graceful shutdown.
//!
//! On shutdown (SIGTERM from an orchestrator, Ctrl-C in development) the
//! server:
//! 1. immediately stops accepting new connections,
//! 2. lets every in-flight connection task run to completion,
//! 3. returns from [`Server::serve`], letting `main` exit cleanly.
//!
//! Background services started by the application are not part of the
//! drain; they have no shutdown hook and end with the process.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app::App;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server. Usually driven indirectly through
/// [`App::listen_and_serve`].
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `app`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, app: App) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared across concurrent connection tasks without copying the
        // routing table.
        let app = Arc::new(app);

        info!(addr = %self.addr, "vega listening");

        // JoinSet tracks every spawned connection task so graceful shutdown
        // can wait for them all.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a shutdown signal
                // stops the accept loop even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection, not
                        // once per connection.
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { handle_request(app, req).await }
                        });

                        // The auto builder speaks both HTTP/1.1 and HTTP/2,
                        // whichever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not
                // grow without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("vega stopped");
        Ok(())
    }
}

/// Collects the request body, hands the request to the application's
/// dispatcher, and converts the buffered response to the wire type.
///
/// The error type is [`Infallible`]: every failure becomes a status code,
/// so hyper never sees an error from us.
async fn handle_request(
    app: Arc<App>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("failed to read request body: {e}");
            let mut res = Response::new();
            res.set_status(StatusCode::BAD_REQUEST);
            return Ok(res.into_http());
        }
    };

    let request = Request::from_parts(parts, body);
    Ok(app.dispatch(request).into_http())
}

/// Resolves on the first shutdown signal the process receives: SIGTERM or
/// SIGINT (Ctrl-C) on Unix, Ctrl-C elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves, so on non-Unix platforms the SIGTERM arm
    // is effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
