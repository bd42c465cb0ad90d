//! Server construction and middleware wiring.

pub mod config;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backend::inbound::http;
use backend::inbound::http::state::HttpState;
use backend::middleware::RequestLog;

use config::AppConfig;

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    App::new()
        .app_data(http_state)
        .wrap(session)
        .wrap(RequestLog)
        .configure(http::configure)
}

/// Construct the HTTP server over the shared application state.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// [`std::io::Error`] when no usable session key is configured or the
/// socket cannot be bound.
pub fn create_server(config: &AppConfig, http_state: HttpState) -> std::io::Result<Server> {
    let key = config.session_key().map_err(std::io::Error::other)?;
    let cookie_secure = config.cookie_secure();
    let http_state = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
        })
    })
    .bind(config.bind())?
    .run();

    Ok(server)
}
