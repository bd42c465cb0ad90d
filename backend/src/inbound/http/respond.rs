//! Small response builders shared by the page handlers.

use actix_web::HttpResponse;
use actix_web::http::header::{self, ContentType};

/// 200 response carrying a rendered page.
pub fn html(page: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page)
}

/// 422 response re-rendering a form with its validation message.
pub fn unprocessable(page: String) -> HttpResponse {
    HttpResponse::UnprocessableEntity()
        .content_type(ContentType::html())
        .body(page)
}

/// 303 redirect, the response to every successful form post.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
