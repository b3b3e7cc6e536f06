//! Per-request context and the dispatch state machine.
//!
//! A [`Context`] is created fresh for each matched request and owned by the
//! task handling that request. It carries the matched route, the parsed
//! request, path parameters, an optional session, and a request-scoped
//! key/value store. Nothing in here is synchronized: one context is only
//! ever touched by the one request it belongs to.
//!
//! # Dispatch
//!
//! [`Context::run`] drives the route's callables through four states:
//!
//! ```text
//! Before(0) .. Before(n-1) -> Controller -> After(0) .. After(m-1) -> Done
//! ```
//!
//! The state is advanced *before* each callable is invoked, which gives the
//! guarantees the rest of the crate relies on:
//!
//! - the controller runs exactly once per request,
//! - before-middlewares run in registration order, then never again,
//! - after-middlewares run in registration order, never before the
//!   controller,
//! - calling `run` again once the state is `Done` is a no-op, including
//!   re-entrant calls from inside a middleware.
//!
//! A before-middleware can short-circuit the chain by returning
//! [`Flow::Abort`]: the remaining before-middlewares and the controller are
//! skipped, but the after-chain still runs so cleanup always happens.

use std::any::Any;
use std::collections::HashMap;

use tracing::debug;

use crate::app::App;
use crate::request::Request;
use crate::response::Response;
use crate::route::{Flow, Route};
use crate::session::Session;

/// Scoped-data key under which a recovered panic payload is stored before
/// the panic-handler route is dispatched.
pub const PANIC_PAYLOAD_KEY: &str = "panic.payload";

/// Request-scoped key/value store. Values are type-erased; retrieval is by
/// key plus the concrete type.
pub type ScopedData = HashMap<String, Box<dyn Any + Send>>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DispatchState {
    Before(usize),
    Controller,
    After(usize),
    Done,
}

/// Per-request state carrier, passed to every middleware and controller
/// handling the request.
pub struct Context<'a> {
    state: DispatchState,
    app: &'a App,
    route: &'a Route,
    params: HashMap<String, String>,
    /// The parsed inbound request.
    pub request: Request,
    session: Option<Box<dyn Session>>,
    data: ScopedData,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        app: &'a App,
        route: &'a Route,
        params: HashMap<String, String>,
        request: Request,
    ) -> Self {
        Self {
            state: DispatchState::Before(0),
            app,
            route,
            params,
            request,
            session: None,
            data: ScopedData::new(),
        }
    }

    /// Runs the route's before-chain, controller, and after-chain to
    /// completion.
    ///
    /// The server glue calls this once per request. Calling it again after
    /// the chain has finished has no effect.
    pub fn run(&mut self, res: &mut Response) {
        let route = self.route;
        loop {
            match self.state {
                DispatchState::Before(i) if i < route.before.len() => {
                    self.state = DispatchState::Before(i + 1);
                    if let Flow::Abort(reason) = (route.before[i])(self, res) {
                        debug!(reason, "before-middleware aborted dispatch");
                        self.state = DispatchState::After(0);
                    }
                }
                DispatchState::Before(_) => self.state = DispatchState::Controller,
                DispatchState::Controller => {
                    self.state = DispatchState::After(0);
                    (route.controller)(self, res);
                }
                DispatchState::After(i) if i < route.after.len() => {
                    self.state = DispatchState::After(i + 1);
                    if let Flow::Abort(reason) = (route.after[i])(self, res) {
                        debug!(reason, "after-middleware aborted dispatch");
                        self.state = DispatchState::Done;
                    }
                }
                DispatchState::After(_) => self.state = DispatchState::Done,
                DispatchState::Done => return,
            }
        }
    }

    /// Returns a named path parameter from the route match.
    ///
    /// For a route `/users/{id}`, `ctx.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Stores a request-scoped value under the given key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Any + Send) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Returns the request-scoped value stored under `key`, if it exists
    /// and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.data.get(key)?.downcast_ref()
    }

    /// Inserts an already-boxed value. Used for panic payloads, whose
    /// concrete type is unknown at the insertion site.
    pub(crate) fn set_any(&mut self, key: impl Into<String>, value: Box<dyn Any + Send>) {
        self.data.insert(key.into(), value);
    }

    /// The whole request-scoped store, as handed to a
    /// [`Renderer`](crate::Renderer).
    pub fn data(&self) -> &ScopedData {
        &self.data
    }

    /// The owning application.
    pub fn app(&self) -> &App {
        self.app
    }

    /// The matched route.
    pub fn route(&self) -> &Route {
        self.route
    }

    /// Attaches a session to this request.
    pub fn set_session(&mut self, session: Box<dyn Session>) {
        self.session = Some(session);
    }

    /// The session attached by a middleware, if any.
    pub fn session(&mut self) -> Option<&mut dyn Session> {
        self.session.as_deref_mut()
    }

    /// The panic payload as a string, if a panic-handler route is running
    /// and the payload was a string (the common case for `panic!`).
    pub fn panic_message(&self) -> Option<&str> {
        let payload = self.data.get(PANIC_PAYLOAD_KEY)?;
        if let Some(s) = payload.downcast_ref::<&'static str>() {
            Some(s)
        } else {
            payload.downcast_ref::<String>().map(String::as_str)
        }
    }

    pub(crate) fn into_request(self) -> Request {
        self.request
    }
}

/// Best-effort string form of a panic payload, for logging.
pub(crate) fn describe_panic(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
