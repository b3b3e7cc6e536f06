//! Route registration: named routes, prefix groups, and middleware capture.
//!
//! The router translates each registration into a [`Route`], stores it in a
//! name-keyed registry, and inserts the composed path into one radix tree
//! per HTTP method. Matching itself is [`matchit`]'s concern; everything
//! here is composition.
//!
//! Path parameters use `{name}` syntax and are retrieved with
//! [`Context::param`](crate::Context::param); `{*rest}` catches the whole
//! remaining path.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as PathRouter;

use crate::context::Context;
use crate::response::Response;
use crate::route::{controller, ControllerFn, MiddlewareChain, MiddlewareFn, Route};
use crate::static_files::FileSystem;

/// The registration half of an application.
///
/// Obtained from [`App::router_mut`](crate::App::router_mut). All
/// registration happens before serving starts; at request time the router
/// is only read.
pub struct Router {
    /// One radix tree per HTTP method, mapping a path to the name of the
    /// route it dispatches to.
    trees: HashMap<Method, PathRouter<String>>,

    /// All registered routes, keyed by their composed name.
    routes: HashMap<String, Route>,

    /// The middleware set captured into the before-chain of every route
    /// registered next.
    middlewares: MiddlewareChain,

    /// Prefix joined onto the path of every registered route. Set inside
    /// groups.
    path_prefix: String,

    /// Prefix prepended to the name of every registered route. Set inside
    /// groups.
    name_prefix: String,

    not_found: Option<Route>,
    panic_route: Option<Route>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self {
            trees: HashMap::new(),
            routes: HashMap::new(),
            middlewares: MiddlewareChain::new(),
            path_prefix: String::new(),
            name_prefix: String::new(),
            not_found: None,
            panic_route: None,
        }
    }

    /// Replaces the router's middleware set.
    ///
    /// The set is captured by every route registered afterwards; routes
    /// already registered keep the chains they were built with.
    pub fn use_middlewares(&mut self, middlewares: impl IntoIterator<Item = MiddlewareFn>) {
        self.middlewares = middlewares.into_iter().collect();
    }

    /// Registers a route for a method and path pair.
    ///
    /// The path and name are composed with the current group prefixes, and
    /// the current middleware set is cloned into the route's before-chain.
    /// The returned reference allows chain adjustments:
    ///
    /// ```rust
    /// use vega::{controller, middleware, App, Context, Flow, Response};
    ///
    /// let audit = middleware(|_: &mut Context<'_>, _: &mut Response| Flow::Continue);
    ///
    /// let mut app = App::new();
    /// app.router_mut()
    ///     .get("/users/{id}", "users.show", controller(|ctx: &mut Context<'_>, res: &mut Response| {
    ///         let id = ctx.param("id").unwrap_or("unknown");
    ///         res.text(format!("user {id}"));
    ///     }))
    ///     .set_after([audit]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the composed path conflicts with an already-registered
    /// route, which is a startup error. Registering the same name twice
    /// replaces the registry entry, like any map insert.
    pub fn handle(
        &mut self,
        method: Method,
        path: &str,
        name: &str,
        controller: ControllerFn,
    ) -> &mut Route {
        let full_path = join_paths(&self.path_prefix, path);
        let full_name = format!("{}{}", self.name_prefix, name);
        let route = Route::new(full_path.clone(), self.middlewares.clone(), controller);

        self.trees
            .entry(method)
            .or_default()
            .insert(full_path.clone(), full_name.clone())
            .unwrap_or_else(|e| panic!("invalid route `{full_path}`: {e}"));

        match self.routes.entry(full_name) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(route);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(route),
        }
    }

    /// Registers a GET route. See [`Router::handle`].
    pub fn get(&mut self, path: &str, name: &str, controller: ControllerFn) -> &mut Route {
        self.handle(Method::GET, path, name, controller)
    }

    /// Registers a POST route. See [`Router::handle`].
    pub fn post(&mut self, path: &str, name: &str, controller: ControllerFn) -> &mut Route {
        self.handle(Method::POST, path, name, controller)
    }

    /// Registers a PUT route. See [`Router::handle`].
    pub fn put(&mut self, path: &str, name: &str, controller: ControllerFn) -> &mut Route {
        self.handle(Method::PUT, path, name, controller)
    }

    /// Registers a PATCH route. See [`Router::handle`].
    pub fn patch(&mut self, path: &str, name: &str, controller: ControllerFn) -> &mut Route {
        self.handle(Method::PATCH, path, name, controller)
    }

    /// Registers a DELETE route. See [`Router::handle`].
    pub fn delete(&mut self, path: &str, name: &str, controller: ControllerFn) -> &mut Route {
        self.handle(Method::DELETE, path, name, controller)
    }

    /// Registers a HEAD route. See [`Router::handle`].
    pub fn head(&mut self, path: &str, name: &str, controller: ControllerFn) -> &mut Route {
        self.handle(Method::HEAD, path, name, controller)
    }

    /// Registers an OPTIONS route. See [`Router::handle`].
    pub fn options(&mut self, path: &str, name: &str, controller: ControllerFn) -> &mut Route {
        self.handle(Method::OPTIONS, path, name, controller)
    }

    /// Registers routes under common path and name prefixes.
    ///
    /// `register` runs against this router with the prefixes joined onto
    /// any enclosing group's and with `middlewares` appended to the current
    /// middleware set; both are restored afterwards. Groups nest.
    ///
    /// ```rust
    /// use vega::{controller, App, Context, Response};
    ///
    /// let mut app = App::new();
    /// app.router_mut().group("/admin", "admin::", |r| {
    ///     r.get("/x", "list", controller(|_: &mut Context<'_>, res: &mut Response| {
    ///         res.text("admin list");
    ///     }));
    /// }, []);
    ///
    /// assert_eq!(app.route("admin::list"), Some("/admin/x"));
    /// ```
    pub fn group<F>(
        &mut self,
        path_prefix: &str,
        name_prefix: &str,
        register: F,
        middlewares: impl IntoIterator<Item = MiddlewareFn>,
    ) where
        F: FnOnce(&mut Router),
    {
        let saved_path = std::mem::take(&mut self.path_prefix);
        let saved_name = self.name_prefix.clone();
        let saved_middlewares = self.middlewares.clone();

        self.path_prefix = join_paths(&saved_path, path_prefix);
        self.name_prefix = format!("{saved_name}{name_prefix}");
        self.middlewares.extend(middlewares);

        register(self);

        self.path_prefix = saved_path;
        self.name_prefix = saved_name;
        self.middlewares = saved_middlewares;
    }

    /// Installs a controller for requests no route matches.
    ///
    /// It is dispatched as a normal route, middleware chains included, with
    /// the response status preset to 404. Without one, unmatched requests
    /// get a bare 404.
    pub fn not_found(&mut self, controller: ControllerFn) {
        self.not_found = Some(Route::new(String::new(), MiddlewareChain::new(), controller));
    }

    /// Installs a controller for requests whose chain panicked.
    ///
    /// The recovered payload is placed in the fresh context's scoped data
    /// under [`PANIC_PAYLOAD_KEY`](crate::PANIC_PAYLOAD_KEY) before the
    /// controller runs; [`Context::panic_message`](crate::Context::panic_message)
    /// reads it back. Without one, a panicked request gets a bare 500.
    pub fn panic_handler(&mut self, controller: ControllerFn) {
        self.panic_route = Some(Route::new(String::new(), MiddlewareChain::new(), controller));
    }

    /// Mounts a [`FileSystem`] under a path prefix, serving
    /// `GET {mount}/{*filepath}`.
    pub fn serve_static(&mut self, mount: &str, fs: impl FileSystem + 'static) {
        let fs = Arc::new(fs);
        let serve = controller(move |ctx: &mut Context<'_>, res: &mut Response| {
            let file = ctx.param("filepath").unwrap_or_default().to_owned();
            res.static_file(fs.as_ref(), &file);
        });
        let path = join_paths(mount, "{*filepath}");
        let name = format!("static::{mount}");
        self.handle(Method::GET, &path, &name, serve);
    }

    /// Looks up the route for a method and path, returning it with the
    /// extracted path parameters.
    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(&Route, HashMap<String, String>)> {
        let tree = self.trees.get(method)?;
        let matched = tree.at(path).ok()?;
        let route = self.routes.get(matched.value.as_str())?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((route, params))
    }

    pub(crate) fn not_found_route(&self) -> Option<&Route> {
        self.not_found.as_ref()
    }

    pub(crate) fn panic_route(&self) -> Option<&Route> {
        self.panic_route.as_ref()
    }

    pub(crate) fn route_path(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(Route::path)
    }

    pub(crate) fn routes(&self) -> &HashMap<String, Route> {
        &self.routes
    }
}

/// Joins a prefix and a path with exactly one slash between them. An empty
/// prefix leaves the path untouched, so top-level registrations keep their
/// spelling.
fn join_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_owned();
    }
    if path.is_empty() {
        return prefix.to_owned();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), path.trim_start_matches('/'))
}
