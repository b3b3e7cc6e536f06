//! # vega
//!
//! A small web framework: named routes, before/after middleware chains,
//! and a response helper with pluggable rendering.
//!
//! ## The shape
//!
//! You register URL/method pairs bound to controllers, each under a name
//! you can look the path up by later. Around every controller runs a chain
//! of middlewares: *before* ones, in registration order, then the
//! controller exactly once, then *after* ones. A middleware can abort the
//! chain, which skips the controller but still runs the cleanup half.
//! Path matching is [`matchit`]'s radix tree; HTTP is hyper and tokio with
//! graceful shutdown. vega itself is the part in between: composition,
//! dispatch, and response writing.
//!
//! Everything heavy is a capability you plug in: templating is a
//! [`Renderer`], sessions are a [`Session`], static files come from a
//! [`FileSystem`], background tasks are [`Service`]s started at boot.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use vega::{controller, middleware, App, Context, Flow, Response, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = App::new();
//!
//!     app.router_mut().get("/", "index", controller(
//!         |_: &mut Context<'_>, res: &mut Response| {
//!             res.text("Hello world!");
//!         },
//!     ));
//!
//!     app.router_mut().group("/admin", "admin::", |r| {
//!         r.get("/stats", "stats", controller(
//!             |_: &mut Context<'_>, res: &mut Response| {
//!                 res.json(br#"{"requests":0}"#.to_vec());
//!             },
//!         ));
//!     }, [middleware(|ctx: &mut Context<'_>, res: &mut Response| {
//!         if ctx.request.header("authorization").is_none() {
//!             res.set_status(StatusCode::UNAUTHORIZED);
//!             return Flow::Abort("missing authorization header");
//!         }
//!         Flow::Continue
//!     })]);
//!
//!     app.listen_and_serve("127.0.0.1:8080").await.expect("server error");
//! }
//! ```
//!
//! ## Testing handlers
//!
//! [`App::dispatch`] runs the full match-and-chain path on a hand-built
//! [`Request`], no socket required:
//!
//! ```rust
//! use vega::{controller, App, Context, Method, Request, Response};
//!
//! let mut app = App::new();
//! app.router_mut().get("/users/{id}", "users.show", controller(
//!     |ctx: &mut Context<'_>, res: &mut Response| {
//!         res.text(format!("user {}", ctx.param("id").unwrap_or("?")));
//!     },
//! ));
//!
//! let res = app.dispatch(Request::new(Method::GET, "/users/42"));
//! assert_eq!(res.body(), b"user 42");
//! ```

mod app;
mod context;
mod error;
mod renderer;
mod request;
mod response;
mod route;
mod router;
mod server;
mod service;
mod session;
mod static_files;

pub mod health;
pub mod middleware;

pub use app::App;
pub use context::{Context, ScopedData, PANIC_PAYLOAD_KEY};
pub use error::Error;
pub use renderer::Renderer;
pub use request::Request;
pub use response::Response;
pub use route::{controller, middleware, ControllerFn, Flow, MiddlewareChain, MiddlewareFn, Route};
pub use router::Router;
pub use server::Server;
pub use service::{BoxFuture, Service};
pub use session::Session;
pub use static_files::{Dir, FileSystem};

pub use http::{Method, StatusCode};
