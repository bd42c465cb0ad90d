//! HTTP inbound adapter serving the recipe pages.
//!
//! Purpose: translate browser requests (forms, multipart uploads, session
//! cookies) into domain service calls and render the resulting pages.
//!
//! # Architecture
//! - `session`: cookie-session wrapper plus the signed-in-user extractor.
//! - `pages`: in-crate HTML rendering (shared layout, per-page functions).
//! - `auth`, `recipes`, `images`: the route handlers.
//! - `error` / `respond`: failure mapping and small response builders.

pub mod auth;
pub mod error;
pub mod images;
pub mod pages;
pub mod recipes;
pub mod respond;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::{PageError, PageResult};

use actix_web::web;

/// Register every route of the application on `cfg`.
///
/// The server binary and the handler tests share this one registration so
/// the routed surface cannot drift between them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::welcome)
        .service(auth::sign_in_form)
        .service(auth::sign_in)
        .service(auth::sign_in_cancel)
        .service(auth::register_form)
        .service(auth::register)
        .service(auth::register_cancel)
        .service(auth::sign_out)
        .service(recipes::recipe_list)
        .service(recipes::recipe_detail)
        .service(recipes::add_recipe_form)
        .service(recipes::add_recipe)
        .service(recipes::add_recipe_cancel)
        .service(recipes::edit_recipe_form)
        .service(recipes::edit_recipe)
        .service(recipes::delete_recipe)
        .service(images::image_form)
        .service(images::set_image)
        .service(images::delete_image)
        .service(images::serve_image);
}
