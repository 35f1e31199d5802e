use bytes::Bytes;
use http::header::LOCATION;
use http::{Response, StatusCode};
use http_body_util::Full;

use crate::error::AppError;

pub const INDEX_PAGE: &str = "/static/index.html";

pub fn index() -> Result<Response<Full<Bytes>>, AppError> {
    Ok(Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(LOCATION, INDEX_PAGE)
        .body(Full::default())?)
}
