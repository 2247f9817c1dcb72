use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::{de::DeserializeOwned, Serialize};

use crate::types::response::{CommonResponse, ResourceResponse, MIME_TEXT};

pub const AUTHZ_ERROR: &str = "Authorization failed";
pub const CONFIG_ERROR: &str = "Authorization is misconfigured";

/// A wrapper struct for HTTP responses that provides convenient methods
/// for creating common response types
pub struct Response {
    http_response: HttpResponse,
    message: Option<String>,
}

impl Response {
    pub fn not_found() -> Self {
        Self::err_response(StatusCode::NOT_FOUND, "Resource not found".to_string())
    }

    pub fn unauthorized(message: &str) -> Self {
        let message = format!("Unauthorized: {message}");
        Self::err_response(StatusCode::FORBIDDEN, message)
    }

    pub fn error(message: &str) -> Self {
        let message = format!("Server error: {message}");
        Self::err_response(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn ok() -> Self {
        Self::ok_response()
    }

    pub fn json<T: Serialize + DeserializeOwned>(data: T) -> Self {
        Self::resource_response(data)
    }

    /// A plain text response with the given status.
    pub fn text(status: StatusCode, message: impl ToString) -> Self {
        let message = message.to_string();
        Self {
            http_response: HttpResponseBuilder::new(status)
                .content_type(MIME_TEXT)
                .body(message.clone()),
            message: Some(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.http_response.status()
    }

    /// The error message carried by the response, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn ok_response() -> Self {
        let resp = CommonResponse {
            code: StatusCode::OK.into(),
            message: None,
        };
        Self {
            http_response: HttpResponse::Ok().json(resp),
            message: None,
        }
    }

    fn resource_response<T: Serialize + DeserializeOwned>(rsc: T) -> Self {
        let resp = ResourceResponse::<T> {
            code: StatusCode::OK.into(),
            message: None,
            data: Some(rsc),
        };
        Self {
            http_response: HttpResponse::Ok().json(resp),
            message: None,
        }
    }

    fn err_response(status: StatusCode, message: String) -> Self {
        let resp = CommonResponse {
            code: status.into(),
            message: Some(message.clone()),
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
            message: Some(message),
        }
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}
