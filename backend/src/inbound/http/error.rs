//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while giving handlers a
//! single error path for failures no form can fix. Validation problems never
//! reach this module; handlers re-render their form with the message
//! instead. What remains is storage and upload trouble, rendered as a
//! generic failure page with the detail kept to the log.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::DomainError;
use crate::inbound::http::pages;

/// Result alias for page handlers.
pub type PageResult = Result<HttpResponse, PageError>;

/// Infrastructure failure carried out of a handler.
#[derive(Debug)]
pub struct PageError(DomainError);

impl From<DomainError> for PageError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!(kind = ?self.0.kind(), "request failed: {}", self.0);
        HttpResponse::InternalServerError()
            .content_type(ContentType::html())
            .body(pages::failure())
    }
}
