//! The application: route registry, shared state, and background services.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use http::StatusCode;
use tracing::{error, info};

use crate::context::{describe_panic, Context, PANIC_PAYLOAD_KEY};
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;
use crate::router::Router;
use crate::server::Server;
use crate::service::Service;

/// The application.
///
/// Owns the router with every registered route, an application-scoped
/// key/value store shared by all requests, and the named background
/// services started at boot. Registration happens on `&mut App` before
/// serving; while serving, the app is shared immutably across request
/// tasks and only the data store (behind its lock) is ever written.
///
/// ```rust,no_run
/// use vega::{controller, App, Context, Response};
///
/// #[tokio::main]
/// async fn main() {
///     let mut app = App::new();
///     app.router_mut().get("/", "index", controller(
///         |_: &mut Context<'_>, res: &mut Response| {
///             res.text("Hello world!");
///         },
///     ));
///     app.listen_and_serve("127.0.0.1:8080").await.expect("server error");
/// }
/// ```
pub struct App {
    router: Router,

    /// Application-scoped data. Written rarely (typically at startup),
    /// read from every request task, hence the reader/writer lock.
    data: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,

    /// Named background services. Registration finishes before serving
    /// starts, so no lock.
    services: HashMap<String, Arc<dyn Service>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            data: RwLock::new(HashMap::new()),
            services: HashMap::new(),
        }
    }

    /// The router, for matching inspection.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The router, for registering routes, groups, and middlewares.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Stores an application-scoped value under the given key.
    pub fn set(&self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.write_data().insert(key.into(), Arc::new(value));
    }

    /// Returns the application-scoped value stored under `key`, if it
    /// exists and has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.read_data().get(key).cloned()?;
        value.downcast().ok()
    }

    /// Registers a named background service. Call before
    /// [`listen_and_serve`](App::listen_and_serve).
    pub fn set_service(&mut self, key: impl Into<String>, service: Arc<dyn Service>) {
        self.services.insert(key.into(), service);
    }

    /// Returns the service registered under `key`.
    pub fn service(&self, key: &str) -> Option<Arc<dyn Service>> {
        self.services.get(key).cloned()
    }

    /// Returns the path of the route registered under `name`.
    pub fn route(&self, name: &str) -> Option<&str> {
        self.router.route_path(name)
    }

    /// All registered routes, keyed by name.
    pub fn routes(&self) -> &HashMap<String, Route> {
        self.router.routes()
    }

    /// Spawns every registered service, fire-and-forget.
    ///
    /// Nothing supervises the spawned tasks: a service that stops or fails
    /// does so silently. Called by
    /// [`listen_and_serve`](App::listen_and_serve).
    pub fn start_services(&self) {
        for (name, service) in &self.services {
            info!(service = %name, "starting service");
            tokio::spawn(service.run());
        }
    }

    /// Matches and runs one request through its route's chain, producing
    /// the buffered response.
    ///
    /// This is the seam the server glue calls per request, and the one to
    /// use in tests: no socket involved.
    pub fn dispatch(&self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.path().to_owned();

        if let Some((route, params)) = self.router.lookup(&method, &path) {
            return self.run_route(route, params, request, Response::new());
        }

        let mut res = Response::new();
        res.set_status(StatusCode::NOT_FOUND);
        match self.router.not_found_route() {
            Some(route) => self.run_route(route, HashMap::new(), request, res),
            None => res,
        }
    }

    /// Starts background services, then serves HTTP on `addr` until a
    /// shutdown signal arrives and in-flight connections drain.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub async fn listen_and_serve(self, addr: &str) -> Result<(), Error> {
        self.start_services();
        Server::bind(addr).serve(self).await
    }

    fn run_route(
        &self,
        route: &Route,
        params: HashMap<String, String>,
        request: Request,
        mut res: Response,
    ) -> Response {
        let mut ctx = Context::new(self, route, params, request);
        match catch_unwind(AssertUnwindSafe(|| ctx.run(&mut res))) {
            Ok(()) => res,
            Err(payload) => {
                error!(
                    path = %ctx.request.path(),
                    "panic while handling request: {}",
                    describe_panic(payload.as_ref()),
                );
                self.run_panic_route(ctx.into_request(), payload, res)
            }
        }
    }

    fn run_panic_route(
        &self,
        request: Request,
        payload: Box<dyn Any + Send>,
        mut res: Response,
    ) -> Response {
        let Some(route) = self.router.panic_route() else {
            res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            return res;
        };

        let mut ctx = Context::new(self, route, HashMap::new(), request);
        ctx.set_any(PANIC_PAYLOAD_KEY, payload);
        match catch_unwind(AssertUnwindSafe(|| ctx.run(&mut res))) {
            Ok(()) => res,
            Err(payload) => {
                // The panic handler itself panicked; nothing left to try.
                error!(
                    "panic handler panicked: {}",
                    describe_panic(payload.as_ref()),
                );
                res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                res
            }
        }
    }

    fn read_data(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn Any + Send + Sync>>> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<dyn Any + Send + Sync>>> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
