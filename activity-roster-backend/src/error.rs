use activity_roster_config::ConfigError;
use bytes::Bytes;
use headers::{Allow, ContentType, HeaderMapExt as _};
use http::{Method, Response, StatusCode};
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::store::{CatalogError, RosterError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Roster(#[from] RosterError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("http error: {0}")]
    Http(#[from] http::Error),
    #[error("webserver error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("invalid query: {0}")]
    Query(#[from] serde_urlencoded::de::Error),
    #[error("Not Found")]
    RouteNotFound,
    #[error("Method Not Allowed")]
    MethodNotAllowed(&'static [Method]),
}

/// Body of every error response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Roster(RosterError::NotFound) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Roster(RosterError::AlreadyEnrolled { .. } | RosterError::NotEnrolled { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Query(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Catalog(_)
            | Self::Config(_)
            | Self::File(_)
            | Self::Json(_)
            | Self::Http(_)
            | Self::Hyper(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{self}");
        } else {
            debug!(%status, "{self}");
        }

        let body = serde_json::json!({ "detail": self.to_string() }).to_string();
        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response.headers_mut().typed_insert(ContentType::json());
        if let Self::MethodNotAllowed(methods) = self {
            response
                .headers_mut()
                .typed_insert(methods.iter().cloned().collect::<Allow>());
        }
        response
    }
}
