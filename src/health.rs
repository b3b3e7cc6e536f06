//! Health-check controllers.
//!
//! Orchestrators ask two questions. These answer them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure leads to a restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure pulls it from the load balancer. |
//!
//! Register them like any controller:
//!
//! ```rust
//! use vega::{controller, health, App};
//!
//! let mut app = App::new();
//! app.router_mut().get("/healthz", "healthz", controller(health::liveness));
//! app.router_mut().get("/readyz", "readyz", controller(health::readiness));
//! ```
//!
//! Replace `readiness` with your own controller to gate on dependency
//! availability (database connections, downstream services, warm caches).

use crate::context::Context;
use crate::response::Response;

/// Liveness probe controller. Always `200 OK` with body `"ok"`; if the
/// process can respond to HTTP at all, it is alive.
pub fn liveness(_ctx: &mut Context<'_>, res: &mut Response) {
    res.text("ok");
}

/// Readiness probe controller, default implementation: `200 OK` with body
/// `"ready"`.
pub fn readiness(_ctx: &mut Context<'_>, res: &mut Response) {
    res.text("ready");
}
