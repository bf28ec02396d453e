//! Orchestrator probes for the vending service.
//!
//! `/health` answers as long as the process can route a request.
//! `/health/ready` waits for the account store pool to exist and
//! `/health/live` turns red once shutdown begins.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{HttpResponse, get, web};

/// Process-wide probe flags, registered as `web::Data`.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    alive: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            alive: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Alive but not yet ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the HTTP adapters are wired to the store.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Called when the server starts draining.
    pub fn mark_unhealthy(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

fn uncached(status_ok: bool) -> HttpResponse {
    let mut builder = match status_ok {
        true => HttpResponse::Ok(),
        false => HttpResponse::ServiceUnavailable(),
    };
    builder.insert_header(CacheControl(vec![CacheDirective::NoStore]));
    builder.finish()
}

/// Plain `OK` for the `healthcheck` binary.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Process is routing requests", body = String))
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .insert_header((header::CONTENT_TYPE, "text/plain; charset=utf-8"))
        .body("OK")
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Account store is wired and requests are accepted"),
        (status = 503, description = "Still starting")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    uncached(state.is_ready())
}

#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is running"),
        (status = 503, description = "Shutdown in progress")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    uncached(state.is_alive())
}
