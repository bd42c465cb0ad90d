//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: recording the signed-in user and passing a
//! one-shot flash message to the next rendered page.

use actix_session::Session;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{DomainError, Username};

pub(crate) const USER_KEY: &str = "user";
pub(crate) const FLASH_KEY: &str = "flash";

/// Notice stored by the sign-in gate before redirecting home.
pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record `user` as the signed-in account for this browser.
    pub fn sign_in(&self, user: &Username) -> Result<(), DomainError> {
        self.0
            .insert(USER_KEY, user.as_ref())
            .map_err(|error| DomainError::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the whole session, signing the user out.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// Fetch the signed-in username, if any.
    ///
    /// A stored value that no longer parses as a username is treated as
    /// signed out rather than surfacing an error to the browser.
    pub fn current_user(&self) -> Result<Option<Username>, DomainError> {
        let stored = self
            .0
            .get::<String>(USER_KEY)
            .map_err(|error| DomainError::internal(format!("failed to read session: {error}")))?;
        match stored {
            Some(raw) => match Username::new(raw) {
                Ok(user) => Ok(Some(user)),
                Err(error) => {
                    tracing::warn!("invalid username in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Store a notice for the next rendered page to show once.
    pub fn set_flash(&self, message: &str) {
        if let Err(error) = self.0.insert(FLASH_KEY, message) {
            tracing::warn!("failed to store flash message: {error}");
        }
    }

    /// Take the pending notice, clearing it so it shows exactly once.
    pub fn take_flash(&self) -> Option<String> {
        let message = self.0.get::<String>(FLASH_KEY).ok().flatten()?;
        self.0.remove(FLASH_KEY);
        Some(message)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// The signed-in user, required by every authenticated route.
///
/// Anonymous requests never reach a handler taking this extractor: they are
/// flashed with [`SIGN_IN_REQUIRED`] and redirected to the welcome page.
pub struct CurrentUser(pub Username);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move {
            let session = SessionContext::new(fut.await?);
            match session.current_user() {
                Ok(Some(user)) => Ok(Self(user)),
                Ok(None) => {
                    session.set_flash(SIGN_IN_REQUIRED);
                    Err(SignInRedirect.into())
                }
                Err(error) => {
                    tracing::error!("session read failed: {error}");
                    Err(SignInRedirect.into())
                }
            }
        })
    }
}

/// Error type turning an unauthenticated request into a redirect home.
#[derive(Debug)]
pub struct SignInRedirect;

impl std::fmt::Display for SignInRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("sign-in required")
    }
}

impl actix_web::ResponseError for SignInRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use actix_session::Session;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, HttpResponse, test as actix_test, web};

    use super::{CurrentUser, FLASH_KEY, SessionContext, USER_KEY};
    use crate::domain::Username;

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(crate::inbound::http::test_utils::test_session_middleware())
    }

    fn session_cookie(
        res: &actix_web::dev::ServiceResponse,
    ) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn round_trips_the_signed_in_user() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let user = Username::new("alice").expect("fixture username");
                        session.sign_in(&user).expect("sign in");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|user: CurrentUser| async move {
                        HttpResponse::Ok().body(user.0.to_string())
                    }),
                ),
        )
        .await;

        let set_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let get_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = actix_test::read_body(get_res).await;
        assert_eq!(body, "alice");
    }

    #[actix_web::test]
    async fn anonymous_requests_are_redirected_home() {
        let app = actix_test::init_service(session_test_app().route(
            "/gated",
            web::get().to(|user: CurrentUser| async move {
                HttpResponse::Ok().body(user.0.to_string())
            }),
        ))
        .await;

        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/gated").to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).map(|v| v.as_bytes()),
            Some(b"/".as_slice())
        );
    }

    #[actix_web::test]
    async fn tampered_usernames_count_as_signed_out() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(USER_KEY, "../escape")
                            .expect("set invalid username");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/gated",
                    web::get().to(|user: CurrentUser| async move {
                        HttpResponse::Ok().body(user.0.to_string())
                    }),
                ),
        )
        .await;

        let set_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/gated")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn flash_messages_show_exactly_once() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/flash",
                    web::get().to(|session: SessionContext| async move {
                        session.set_flash("Recipe successfully added.");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/read",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().body(session.take_flash().unwrap_or_default())
                    }),
                ),
        )
        .await;

        let flash_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/flash").to_request()).await;
        let cookie = session_cookie(&flash_res);

        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/read")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let refreshed = session_cookie(&first);
        let body = actix_test::read_body(first).await;
        assert_eq!(body, "Recipe successfully added.");

        let second = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/read")
                .cookie(refreshed)
                .to_request(),
        )
        .await;
        let body = actix_test::read_body(second).await;
        assert_eq!(body, "");
    }

    #[actix_web::test]
    async fn take_flash_ignores_other_session_entries() {
        let app = actix_test::init_service(
            session_test_app()
                .route(
                    "/sign-in",
                    web::get().to(|session: SessionContext| async move {
                        let user = Username::new("alice").expect("fixture username");
                        session.sign_in(&user).expect("sign in");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/read",
                    web::get().to(|session: SessionContext| async move {
                        let flash = session.take_flash();
                        let user = session.current_user().expect("read session");
                        HttpResponse::Ok()
                            .body(format!("{flash:?}/{:?}", user.map(|u| u.to_string())))
                    }),
                ),
        )
        .await;

        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/sign-in").to_request()).await;
        let cookie = session_cookie(&res);

        let read = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/read")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body = actix_test::read_body(read).await;
        assert_eq!(body, "None/Some(\"alice\")");
    }

    #[test]
    fn session_keys_stay_distinct() {
        assert_ne!(USER_KEY, FLASH_KEY);
    }
}
