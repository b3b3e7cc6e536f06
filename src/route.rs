//! Routes and the callable types stored in them.
//!
//! A [`Route`] binds a path to a controller and two middleware chains. The
//! router builds one per registration; [`Context::run`](crate::Context::run)
//! walks it at request time.
//!
//! # How controllers and middlewares are stored
//!
//! A route has to hold callables of *different* concrete types in plain
//! `Vec`s, so both are erased behind `Arc<dyn Fn>`. The [`middleware`] and
//! [`controller`] funnels do the erasure and, more importantly, pin down the
//! higher-ranked signature so closures infer cleanly:
//!
//! ```rust
//! use vega::{controller, middleware, Context, Flow, Response};
//!
//! let auth = middleware(|ctx: &mut Context<'_>, res: &mut Response| {
//!     if ctx.request.header("authorization").is_none() {
//!         res.set_status(vega::StatusCode::UNAUTHORIZED);
//!         return Flow::Abort("missing authorization header");
//!     }
//!     Flow::Continue
//! });
//!
//! let index = controller(|_ctx: &mut Context<'_>, res: &mut Response| {
//!     res.text("Hello world!");
//! });
//! # let _ = (auth, index);
//! ```

use std::sync::Arc;

use crate::context::Context;
use crate::response::Response;

/// Control-flow result of a middleware.
///
/// Returning [`Flow::Abort`] skips any remaining before-middlewares and the
/// controller. The after-chain still runs, so cleanup middlewares (timing,
/// logging) always observe the request. The reason is logged at debug level.
pub enum Flow {
    /// Proceed to the next step of the chain.
    Continue,
    /// Stop the before-phase, skipping the controller.
    Abort(&'static str),
}

/// A middleware callable. Build one with [`middleware`].
pub type MiddlewareFn = Arc<dyn Fn(&mut Context<'_>, &mut Response) -> Flow + Send + Sync>;

/// A controller callable. Build one with [`controller`].
pub type ControllerFn = Arc<dyn Fn(&mut Context<'_>, &mut Response) + Send + Sync>;

/// An ordered middleware sequence. Execution order is registration order.
pub type MiddlewareChain = Vec<MiddlewareFn>;

/// Erase a middleware function or closure into a [`MiddlewareFn`].
pub fn middleware<F>(f: F) -> MiddlewareFn
where
    F: Fn(&mut Context<'_>, &mut Response) -> Flow + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Erase a controller function or closure into a [`ControllerFn`].
pub fn controller<F>(f: F) -> ControllerFn
where
    F: Fn(&mut Context<'_>, &mut Response) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A registered path binding: the full path, the controller, and the before
/// and after middleware chains.
///
/// Routes are created by the router. The chains are cloned out of the
/// router's current middleware set at registration time, so mutating one
/// route never affects a sibling registered from the same router or group.
pub struct Route {
    path: String,
    pub(crate) before: MiddlewareChain,
    pub(crate) controller: ControllerFn,
    pub(crate) after: MiddlewareChain,
}

impl Route {
    pub(crate) fn new(path: String, before: MiddlewareChain, controller: ControllerFn) -> Self {
        Self { path, before, controller, after: MiddlewareChain::new() }
    }

    /// The full route path, including any group prefixes.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Appends middlewares to the before-chain.
    ///
    /// The router may already have placed its own middlewares there; these
    /// run after them.
    pub fn set_before(&mut self, middlewares: impl IntoIterator<Item = MiddlewareFn>) -> &mut Self {
        self.before.extend(middlewares);
        self
    }

    /// Replaces the after-chain with the given middlewares.
    pub fn set_after(&mut self, middlewares: impl IntoIterator<Item = MiddlewareFn>) -> &mut Self {
        self.after = middlewares.into_iter().collect();
        self
    }

    /// The middlewares that run before the controller.
    pub fn before(&self) -> &MiddlewareChain {
        &self.before
    }

    /// The middlewares that run after the controller.
    pub fn after(&self) -> &MiddlewareChain {
        &self.after
    }
}
