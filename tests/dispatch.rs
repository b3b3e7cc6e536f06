//! End-to-end dispatch tests through the public API: register routes on an
//! [`App`], hand-build a [`Request`], and assert on the buffered
//! [`Response`]. No sockets involved.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vega::{
    controller, middleware, App, Context, FileSystem, Flow, Method, Renderer, Request, Response,
    ScopedData, StatusCode,
};

fn text_app(body: &'static str) -> App {
    let mut app = App::new();
    app.router_mut().get("/", "index", controller(
        move |_: &mut Context<'_>, res: &mut Response| {
            res.text(body);
        },
    ));
    app
}

fn marker(log: &Arc<Mutex<String>>, text: &'static str) -> vega::MiddlewareFn {
    let log = Arc::clone(log);
    middleware(move |_: &mut Context<'_>, _: &mut Response| {
        log.lock().unwrap().push_str(text);
        Flow::Continue
    })
}

#[test]
fn get_root_writes_text_and_content_type() {
    let app = text_app("Hello world!");

    let res = app.dispatch(Request::new(Method::GET, "/"));

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"Hello world!");
    assert_eq!(res.get_header("Content-Type"), Some("text/plain"));
}

#[test]
fn every_method_shortcut_registers_a_dispatchable_route() {
    let mut app = App::new();
    let echo = |body: &'static str| {
        controller(move |_: &mut Context<'_>, res: &mut Response| res.text(body))
    };

    app.router_mut().get("/get", "get", echo("get"));
    app.router_mut().post("/post", "post", echo("post"));
    app.router_mut().put("/put", "put", echo("put"));
    app.router_mut().patch("/patch", "patch", echo("patch"));
    app.router_mut().delete("/delete", "delete", echo("delete"));
    app.router_mut().head("/head", "head", echo("head"));
    app.router_mut().options("/options", "options", echo("options"));

    for (method, path) in [
        (Method::GET, "/get"),
        (Method::POST, "/post"),
        (Method::PUT, "/put"),
        (Method::PATCH, "/patch"),
        (Method::DELETE, "/delete"),
        (Method::HEAD, "/head"),
        (Method::OPTIONS, "/options"),
    ] {
        let res = app.dispatch(Request::new(method, path));
        assert_eq!(res.body(), path.trim_start_matches('/').as_bytes());
    }
}

#[test]
fn path_parameters_reach_the_controller() {
    let mut app = App::new();
    app.router_mut().get("/users/{id}", "users.show", controller(
        |ctx: &mut Context<'_>, res: &mut Response| {
            res.text(format!("user {}", ctx.param("id").unwrap_or("?")));
        },
    ));

    let res = app.dispatch(Request::new(Method::GET, "/users/42"));
    assert_eq!(res.body(), b"user 42");
}

#[test]
fn middlewares_and_controller_run_in_registration_order() {
    let log = Arc::new(Mutex::new(String::new()));
    let mut app = App::new();

    let ctrl = {
        let log = Arc::clone(&log);
        controller(move |_: &mut Context<'_>, _: &mut Response| {
            log.lock().unwrap().push_str(":second");
        })
    };
    app.router_mut()
        .get("/", "index", ctrl)
        .set_before([marker(&log, "first")])
        .set_after([marker(&log, ":last")]);

    app.dispatch(Request::new(Method::GET, "/"));

    assert_eq!(*log.lock().unwrap(), "first:second:last");
}

#[test]
fn groups_compose_paths_names_and_middlewares() {
    let log = Arc::new(Mutex::new(String::new()));
    let mut app = App::new();

    let ctrl = {
        let log = Arc::clone(&log);
        controller(move |_: &mut Context<'_>, res: &mut Response| {
            log.lock().unwrap().push_str("last");
            res.text("grouped");
        })
    };
    let m1 = marker(&log, "first:");
    let m2 = marker(&log, "second:");
    app.router_mut().group("/group", "group::", |r| {
        r.get("get", "get", ctrl);
    }, [m1, m2]);

    assert_eq!(app.route("group::get"), Some("/group/get"));

    let res = app.dispatch(Request::new(Method::GET, "/group/get"));
    assert_eq!(res.body(), b"grouped");
    assert_eq!(*log.lock().unwrap(), "first:second:last");
}

#[test]
fn unmatched_requests_get_a_bare_404_by_default() {
    let app = text_app("Hello world!");

    let res = app.dispatch(Request::new(Method::GET, "/notfound"));

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.body().is_empty());
}

#[test]
fn custom_not_found_controller_runs_with_preset_404() {
    let mut app = App::new();
    app.router_mut().not_found(controller(|_: &mut Context<'_>, res: &mut Response| {
        res.text("Not Found");
    }));

    let res = app.dispatch(Request::new(Method::GET, "/notfound"));

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.body(), b"Not Found");
}

#[test]
fn panic_handler_runs_exactly_once_with_the_payload() {
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let mut app = App::new();

    app.router_mut().get("/", "home", controller(
        |_: &mut Context<'_>, _: &mut Response| {
            panic!("stop here");
        },
    ));
    let calls = Arc::clone(&handler_calls);
    app.router_mut().panic_handler(controller(
        move |ctx: &mut Context<'_>, res: &mut Response| {
            calls.fetch_add(1, Ordering::SeqCst);
            res.text(format!("Panic! {}", ctx.panic_message().unwrap_or("?")));
        },
    ));

    let res = app.dispatch(Request::new(Method::GET, "/"));

    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.body(), b"Panic! stop here");
}

#[test]
fn panicking_controller_without_handler_yields_500() {
    let mut app = App::new();
    app.router_mut().get("/", "home", controller(
        |_: &mut Context<'_>, _: &mut Response| {
            panic!("stop here");
        },
    ));

    let res = app.dispatch(Request::new(Method::GET, "/"));

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn aborting_middleware_skips_the_controller_but_not_cleanup() {
    let log = Arc::new(Mutex::new(String::new()));
    let mut app = App::new();

    let guard = middleware(|ctx: &mut Context<'_>, res: &mut Response| {
        if ctx.request.header("authorization").is_none() {
            res.set_status(StatusCode::UNAUTHORIZED);
            res.text("authorization required");
            return Flow::Abort("missing authorization header");
        }
        Flow::Continue
    });
    let ctrl = {
        let log = Arc::clone(&log);
        controller(move |_: &mut Context<'_>, res: &mut Response| {
            log.lock().unwrap().push_str("controller");
            res.text("secret");
        })
    };
    app.router_mut()
        .get("/secret", "secret", ctrl)
        .set_before([guard])
        .set_after([marker(&log, ":cleanup")]);

    let denied = app.dispatch(Request::new(Method::GET, "/secret"));
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(denied.body(), b"authorization required");
    assert_eq!(*log.lock().unwrap(), ":cleanup");

    log.lock().unwrap().clear();
    let allowed = app.dispatch(
        Request::new(Method::GET, "/secret").with_header("authorization", "Bearer dev"),
    );
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(allowed.body(), b"secret");
    assert_eq!(*log.lock().unwrap(), "controller:cleanup");
}

struct MockFs {
    opened: Arc<AtomicBool>,
}

impl FileSystem for MockFs {
    fn open(&self, path: &str) -> std::io::Result<Vec<u8>> {
        self.opened.store(true, Ordering::SeqCst);
        match path.trim_start_matches('/') {
            "app.css" => Ok(b"body{}".to_vec()),
            _ => Err(std::io::Error::new(std::io::ErrorKind::NotFound, "mock miss")),
        }
    }
}

#[test]
fn static_mount_serves_through_the_file_system_collaborator() {
    let opened = Arc::new(AtomicBool::new(false));
    let mut app = App::new();
    app.router_mut().serve_static("/public", MockFs { opened: Arc::clone(&opened) });

    let res = app.dispatch(Request::new(Method::GET, "/public/app.css"));
    assert!(opened.load(Ordering::SeqCst));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"body{}");
    assert_eq!(res.get_header("Content-Type"), Some("text/css"));

    let missing = app.dispatch(Request::new(Method::GET, "/public/missing.css"));
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[test]
fn sibling_routes_do_not_share_chain_mutations() {
    let log = Arc::new(Mutex::new(String::new()));
    let mut app = App::new();

    app.router_mut().use_middlewares([marker(&log, "shared:")]);

    let ctrl = |log: &Arc<Mutex<String>>, tag: &'static str| {
        let log = Arc::clone(log);
        controller(move |_: &mut Context<'_>, _: &mut Response| {
            log.lock().unwrap().push_str(tag);
        })
    };
    app.router_mut()
        .get("/a", "a", ctrl(&log, "a"))
        .set_before([marker(&log, "only-a:")]);
    app.router_mut().get("/b", "b", ctrl(&log, "b"));

    app.dispatch(Request::new(Method::GET, "/a"));
    assert_eq!(*log.lock().unwrap(), "shared:only-a:a");

    log.lock().unwrap().clear();
    app.dispatch(Request::new(Method::GET, "/b"));
    assert_eq!(*log.lock().unwrap(), "shared:b");
}

#[test]
fn use_middlewares_only_applies_to_later_registrations() {
    let log = Arc::new(Mutex::new(String::new()));
    let mut app = App::new();

    let ctrl = |log: &Arc<Mutex<String>>| {
        let log = Arc::clone(log);
        controller(move |_: &mut Context<'_>, _: &mut Response| {
            log.lock().unwrap().push_str("ctrl");
        })
    };

    app.router_mut().get("/before", "before", ctrl(&log));
    app.router_mut().use_middlewares([marker(&log, "mw:")]);
    app.router_mut().get("/after", "after", ctrl(&log));

    app.dispatch(Request::new(Method::GET, "/before"));
    assert_eq!(*log.lock().unwrap(), "ctrl");

    log.lock().unwrap().clear();
    app.dispatch(Request::new(Method::GET, "/after"));
    assert_eq!(*log.lock().unwrap(), "mw:ctrl");
}

struct TitleRenderer;

impl Renderer for TitleRenderer {
    fn render(
        &self,
        out: &mut dyn Write,
        data: &ScopedData,
        templates: &[&str],
    ) -> std::io::Result<()> {
        let title = data
            .get("title")
            .and_then(|v| v.downcast_ref::<String>())
            .map_or("untitled", String::as_str);
        write!(out, "<h1>{title}</h1> via {}", templates.join(","))
    }
}

#[test]
fn html_renders_with_a_middleware_installed_renderer() {
    let mut app = App::new();

    let install = middleware(|_: &mut Context<'_>, res: &mut Response| {
        res.set_renderer(Arc::new(TitleRenderer));
        Flow::Continue
    });
    app.router_mut().use_middlewares([install]);
    app.router_mut().get("/", "index", controller(
        |ctx: &mut Context<'_>, res: &mut Response| {
            let mut data = ScopedData::new();
            data.insert("title".to_owned(), Box::new("home".to_owned()));
            res.html(ctx, data, &["layout", "index"]).expect("renderer installed");
        },
    ));

    let res = app.dispatch(Request::new(Method::GET, "/"));

    assert_eq!(res.get_header("Content-Type"), Some("text/html"));
    assert_eq!(res.body(), b"<h1>home</h1> via layout,index");
}

#[test]
fn app_scoped_data_is_visible_to_controllers() {
    let mut app = App::new();
    app.set("app.name", "vega test".to_owned());
    app.router_mut().get("/", "index", controller(
        |ctx: &mut Context<'_>, res: &mut Response| {
            let name = ctx.app().get::<String>("app.name");
            res.text(name.as_deref().map_or("?", String::as_str));
        },
    ));

    let res = app.dispatch(Request::new(Method::GET, "/"));
    assert_eq!(res.body(), b"vega test");
}
