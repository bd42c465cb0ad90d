//! Test helpers for inbound HTTP components.
//!
//! Shared by the handler unit tests and the integration tests in `tests/`,
//! so both talk to the same app surface: a tempdir-backed state, the test
//! session middleware, and builders for the form and multipart requests the
//! pages submit.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::test;
use tempfile::TempDir;

use crate::domain::{AccountService, RecipeService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    FsImageStore, YamlCredentialStore, YamlRecipeStore, open_data_dir,
};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build the full handler state over a fresh temporary data directory.
///
/// The directory is seeded the way server startup seeds it (an empty
/// credentials file); it lives as long as the returned guard.
pub fn temp_state() -> (HttpState, TempDir) {
    let data_dir = tempfile::tempdir().expect("create data dir");
    let root = Arc::new(open_data_dir(data_dir.path()).expect("open data dir"));
    let credentials = YamlCredentialStore::new(Arc::clone(&root));
    credentials.initialize().expect("seed credentials file");
    let accounts = Arc::new(AccountService::new(Arc::new(credentials)));
    let recipes = Arc::new(RecipeService::new(
        Arc::new(YamlRecipeStore::new(Arc::clone(&root))),
        Arc::new(FsImageStore::new(root)),
    ));
    (HttpState::new(accounts, recipes), data_dir)
}

/// A `POST` of the credentials form, as the sign-in and register pages
/// submit it.
pub fn credentials_request(uri: &str, username: &str, password: &str) -> Request {
    test::TestRequest::post()
        .uri(uri)
        .set_form([("username", username), ("password", password)])
        .to_request()
}

/// The session cookie set on `res`, carrying any just-updated state.
///
/// Only mutating responses reissue the cookie; calling this after a pure
/// read panics.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Register `username` through the real handler and return the session
/// cookie of the signed-in browser.
pub async fn register_and_sign_in<S, B>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res = test::call_service(app, credentials_request("/register", username, password)).await;
    assert!(
        res.status().is_redirection(),
        "registration should redirect, got {}",
        res.status()
    );
    session_cookie(&res)
}

const BOUNDARY: &str = "a8f0e3b1recipes";

enum Part {
    Text(String),
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// Builder for the `multipart/form-data` bodies the add and picture forms
/// submit.
///
/// Setting a field twice replaces the earlier value, like retyping into
/// the same form input.
#[derive(Default)]
pub struct MultipartBody {
    parts: Vec<(String, Part)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.set(name, Part::Text(value.to_owned()));
        self
    }

    /// Set a file field with the given client file name and bytes.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.set(
            name,
            Part::File {
                filename: filename.to_owned(),
                content_type: content_type.to_owned(),
                bytes: bytes.to_vec(),
            },
        );
        self
    }

    fn set(&mut self, name: &str, part: Part) {
        match self.parts.iter_mut().find(|(slot, _)| slot == name) {
            Some(slot) => slot.1 = part,
            None => self.parts.push((name.to_owned(), part)),
        }
    }

    fn finish(self) -> (String, Vec<u8>) {
        let mut body = Vec::new();
        for (name, part) in &self.parts {
            match part {
                Part::Text(value) => body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                         name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .as_bytes(),
                ),
                Part::File {
                    filename,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), body)
    }
}

/// A `POST` of a multipart form from a signed-in browser.
pub fn multipart_request(uri: &str, cookie: Cookie<'static>, form: MultipartBody) -> Request {
    let (content_type, body) = form.finish();
    test::TestRequest::post()
        .uri(uri)
        .cookie(cookie)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request()
}

/// The add form filled with a plain three-field recipe and no picture.
pub fn plain_recipe_form(title: &str) -> MultipartBody {
    MultipartBody::new()
        .text("title", title)
        .text("ingredients", "Eggs\nButter")
        .text("instructions", "Whisk\nScramble")
        .text("notes", "")
        .text("image_choice", "none")
        .text("image_link", "")
}
