//! Built-in middleware.
//!
//! Cross-cutting concerns live here. For now that is request tracing; auth,
//! sessions, and the like are a few lines of application code on top of
//! [`middleware`](crate::middleware()).

use std::time::Instant;

use tracing::info;

use crate::context::Context;
use crate::response::Response;
use crate::route::{middleware, Flow, MiddlewareFn};

const TRACE_START_KEY: &str = "trace.start";

/// A per-request logging pair: the first middleware goes in a before-chain
/// and records the start instant, the second goes in an after-chain and
/// logs method, path, response status, and latency.
///
/// ```rust
/// use vega::{controller, App, Context, Response};
///
/// let (started, logged) = vega::middleware::trace();
///
/// let mut app = App::new();
/// app.router_mut().use_middlewares([started]);
/// app.router_mut()
///     .get("/", "index", controller(|_: &mut Context<'_>, res: &mut Response| {
///         res.text("Hello world!");
///     }))
///     .set_after([logged]);
/// ```
pub fn trace() -> (MiddlewareFn, MiddlewareFn) {
    let started = middleware(|ctx: &mut Context<'_>, _: &mut Response| {
        ctx.set(TRACE_START_KEY, Instant::now());
        Flow::Continue
    });

    let logged = middleware(|ctx: &mut Context<'_>, res: &mut Response| {
        let elapsed = ctx.get::<Instant>(TRACE_START_KEY).map(Instant::elapsed);
        info!(
            method = %ctx.request.method(),
            path = %ctx.request.path(),
            status = res.status().as_u16(),
            ?elapsed,
            "request",
        );
        Flow::Continue
    });

    (started, logged)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use http::Method;

    use super::*;
    use crate::app::App;
    use crate::request::Request;
    use crate::route::{controller, MiddlewareChain, Route};

    #[test]
    fn trace_pair_records_and_consumes_a_start_instant() {
        let app = App::new();
        let (started, logged) = trace();

        let mut route = Route::new("/".into(), MiddlewareChain::new(), controller(|_, _| {}));
        route.set_before([started]);
        route.set_after([logged]);

        let mut ctx = Context::new(&app, &route, HashMap::new(), Request::new(Method::GET, "/"));
        let mut res = Response::new();
        ctx.run(&mut res);

        // The start instant stays in scoped data; the after-middleware must
        // have found it without panicking.
        assert!(ctx.get::<Instant>(TRACE_START_KEY).is_some());
    }
}
