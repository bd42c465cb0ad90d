//! Sign-in, registration, and sign-out handlers.
//!
//! ```text
//! GET  /                 welcome page
//! GET  /signin           sign-in form
//! POST /signin           verify credentials, start the session
//! GET  /signin/cancel    back to the welcome page
//! GET  /register         registration form
//! POST /register         create the account, start the session
//! GET  /register/cancel  back to the welcome page
//! POST /signout          clear the session
//! ```
//!
//! Validation failures re-render the originating form with a message and
//! the typed username; passwords are never echoed back.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{DomainError, Username};
use crate::inbound::http::error::PageResult;
use crate::inbound::http::pages;
use crate::inbound::http::respond::{html, see_other, unprocessable};
use crate::inbound::http::session::{CurrentUser, SessionContext};
use crate::inbound::http::state::HttpState;

/// Credential form fields shared by sign-in and registration.
#[derive(Deserialize)]
pub struct CredentialsForm {
    username: String,
    password: String,
}

#[get("/")]
pub async fn welcome(session: SessionContext) -> HttpResponse {
    html(pages::welcome(session.take_flash().as_deref()))
}

#[get("/signin")]
pub async fn sign_in_form(session: SessionContext) -> HttpResponse {
    html(pages::sign_in(session.take_flash().as_deref(), ""))
}

#[post("/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<CredentialsForm>,
) -> PageResult {
    let CredentialsForm { username, password } = form.into_inner();
    let password = Zeroizing::new(password);
    let typed = username.trim();
    // A malformed username can never match an account, so it gets the same
    // answer as a wrong password.
    let Ok(user) = Username::new(typed) else {
        let message = DomainError::invalid_credentials();
        return Ok(unprocessable(pages::sign_in(Some(message.message()), typed)));
    };
    match state.accounts.verify(&user, &password).await {
        Ok(()) => {
            session.sign_in(&user)?;
            Ok(see_other("/recipes"))
        }
        Err(error) if error.kind().is_user_input() => Ok(unprocessable(pages::sign_in(
            Some(error.message()),
            user.as_ref(),
        ))),
        Err(error) => Err(error.into()),
    }
}

#[get("/signin/cancel")]
pub async fn sign_in_cancel() -> HttpResponse {
    see_other("/")
}

#[get("/register")]
pub async fn register_form(session: SessionContext) -> HttpResponse {
    html(pages::register(session.take_flash().as_deref(), ""))
}

#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<CredentialsForm>,
) -> PageResult {
    let CredentialsForm { username, password } = form.into_inner();
    let password = Zeroizing::new(password);
    let typed = username.trim();
    let user = match Username::new(typed) {
        Ok(user) => user,
        Err(error) => {
            return Ok(unprocessable(pages::register(
                Some(&error.to_string()),
                typed,
            )));
        }
    };
    if password.trim().is_empty() {
        return Ok(unprocessable(pages::register(
            Some("Password can not be empty."),
            typed,
        )));
    }
    match state.accounts.register(&user, &password).await {
        Ok(()) => {
            session.sign_in(&user)?;
            Ok(see_other("/recipes"))
        }
        Err(error) if error.kind().is_user_input() => Ok(unprocessable(pages::register(
            Some(error.message()),
            user.as_ref(),
        ))),
        Err(error) => Err(error.into()),
    }
}

#[get("/register/cancel")]
pub async fn register_cancel() -> HttpResponse {
    see_other("/")
}

#[post("/signout")]
pub async fn sign_out(_user: CurrentUser, session: SessionContext) -> HttpResponse {
    session.sign_out();
    see_other("/")
}
