//! Server construction and middleware wiring.

mod config;

pub use config::AppSettings;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultEnv;
use tracing::info;

use backend::RequestTrace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::configure;
use backend::inbound::http::health::{HealthState, health, live, ready};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DbPool, DieselAccountStore, PoolConfig, run_pending_migrations,
};
use backend::outbound::security::token_config::BuildMode;
use backend::outbound::security::{
    Argon2CredentialVerifier, JwtTokenService, token_settings_from_env,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use config::{CLIENT_REQUEST_TIMEOUT, KEEP_ALIVE, SHUTDOWN_TIMEOUT_SECS};

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(RequestTrace)
        .configure(configure)
        .service(health)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

fn to_io(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(error.to_string())
}

/// Build the HTTP state over the PostgreSQL store, Argon2 hashing and JWT
/// tokens.
///
/// # Errors
/// Propagates invalid settings, token configuration, migration and pool
/// failures as [`std::io::Error`].
async fn build_http_state(settings: &AppSettings) -> std::io::Result<HttpState> {
    let database_url = settings.database_url().map_err(to_io)?;

    if settings.run_migrations() {
        let applied = run_pending_migrations(database_url).await.map_err(to_io)?;
        info!(count = applied.len(), "schema migrations applied");
    }

    let store_timeout = settings.store_timeout().map_err(to_io)?;
    let pool_config = PoolConfig::new(database_url)
        .with_max_size(settings.db_max_connections().map_err(to_io)?)
        .with_checkout_timeout(store_timeout);
    let pool = DbPool::new(pool_config).await.map_err(to_io)?;
    let store = Arc::new(DieselAccountStore::new(pool).with_operation_timeout(store_timeout));

    let token_settings =
        token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .map_err(to_io)?;
    let tokens = Arc::new(JwtTokenService::from_settings(&token_settings));

    Ok(HttpState::from_adapters(
        store,
        Arc::new(Argon2CredentialVerifier::default()),
        tokens,
    ))
}

/// Construct an Actix HTTP server from loaded settings.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener. Readiness is
/// marked once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when wiring adapters, binding the socket or
/// starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    settings: &AppSettings,
) -> std::io::Result<Server> {
    let bind_addr = settings.bind_addr().map_err(to_io)?;
    let http_state = web::Data::new(build_http_state(settings).await?);
    let probes = health_state.clone();

    let server = HttpServer::new(move || build_app(probes.clone(), http_state.clone()))
        .client_request_timeout(CLIENT_REQUEST_TIMEOUT)
        .keep_alive(KEEP_ALIVE)
        .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
