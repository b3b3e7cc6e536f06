//! Minimal vega example: text and JSON routes, a guarded admin group,
//! request tracing, health checks, static files, and a background service.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/admin/stats
//!   curl -H 'authorization: Bearer dev' http://localhost:3000/admin/stats
//!   curl http://localhost:3000/healthz

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use vega::{controller, health, middleware, App, BoxFuture, Context, Dir, Flow, Response, Service, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = App::new();
    app.set("app.name", "vega demo".to_owned());
    app.set_service("heartbeat", Arc::new(Heartbeat));

    let (trace_started, trace_logged) = vega::middleware::trace();
    app.router_mut().use_middlewares([trace_started]);

    app.router_mut()
        .get("/", "index", controller(index))
        .set_after([trace_logged]);
    app.router_mut().get("/users/{id}", "users.show", controller(show_user));

    // Everything under /admin requires an authorization header; the
    // middleware aborts the chain for anonymous requests.
    app.router_mut().group("/admin", "admin::", |r| {
        r.get("/stats", "stats", controller(stats));
    }, [middleware(require_auth)]);

    app.router_mut().get("/healthz", "healthz", controller(health::liveness));
    app.router_mut().get("/readyz", "readyz", controller(health::readiness));

    app.router_mut().serve_static("/public", Dir::new("./public"));

    app.router_mut().not_found(controller(|_: &mut Context<'_>, res: &mut Response| {
        res.text("nothing here");
    }));
    app.router_mut().panic_handler(controller(|ctx: &mut Context<'_>, res: &mut Response| {
        res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        res.text(format!("crashed: {}", ctx.panic_message().unwrap_or("unknown")));
    }));

    app.listen_and_serve("127.0.0.1:3000").await.expect("server error");
}

fn index(ctx: &mut Context<'_>, res: &mut Response) {
    let name = ctx.app().get::<String>("app.name");
    res.text(format!("Hello from {}!", name.as_deref().map_or("vega", String::as_str)));
}

fn show_user(ctx: &mut Context<'_>, res: &mut Response) {
    let id = ctx.param("id").unwrap_or("unknown");
    res.json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes());
}

fn stats(_ctx: &mut Context<'_>, res: &mut Response) {
    res.json(br#"{"requests":0}"#.to_vec());
}

fn require_auth(ctx: &mut Context<'_>, res: &mut Response) -> Flow {
    if ctx.request.header("authorization").is_none() {
        res.set_status(StatusCode::UNAUTHORIZED);
        res.text("authorization required");
        return Flow::Abort("missing authorization header");
    }
    Flow::Continue
}

/// Logs a liveness line once a minute, for as long as the process runs.
struct Heartbeat;

impl Service for Heartbeat {
    fn run(&self) -> BoxFuture {
        Box::pin(async {
            let mut tick = tokio::time::interval(Duration::from_secs(60));
            loop {
                tick.tick().await;
                info!("heartbeat");
            }
        })
    }
}
