pub mod activities;
pub mod index;
pub mod static_files;

use std::borrow::Cow;
use std::convert::Infallible;

use bytes::Bytes;
use headers::ContentType;
use http::request::Parts;
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::{debug, info_span, Instrument as _};

use crate::error::AppError;
use crate::{AppState, ResponseTypedHeaderExt as _};

static ALLOW_GET: [Method; 1] = [Method::GET];
static ALLOW_POST: [Method; 1] = [Method::POST];
static ALLOW_DELETE: [Method; 1] = [Method::DELETE];

#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Index,
    Activities,
    Signup(Cow<'a, str>),
    Unregister(Cow<'a, str>),
    Static(Vec<&'a str>),
}

impl<'a> Route<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();
        Some(match segments.as_slice() {
            [""] => Self::Index,
            ["activities"] => Self::Activities,
            ["activities", name, "signup"] => Self::Signup(decode(*name)),
            ["activities", name, "unregister"] => Self::Unregister(decode(*name)),
            ["static", rest @ ..] if !rest.is_empty() => Self::Static(rest.to_vec()),
            _ => return None,
        })
    }

    fn allowed(&self) -> &'static [Method] {
        match self {
            Self::Index | Self::Activities | Self::Static(_) => &ALLOW_GET,
            Self::Signup(_) => &ALLOW_POST,
            Self::Unregister(_) => &ALLOW_DELETE,
        }
    }
}

fn decode(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> Result<Response<Full<Bytes>>, AppError> {
    Ok(Response::builder()
        .status(status)
        .typed_header(ContentType::json())
        .body(Full::new(Bytes::from(serde_json::to_vec(value)?)))?)
}

async fn dispatch(state: &AppState, parts: &Parts) -> Result<Response<Full<Bytes>>, AppError> {
    let route = Route::parse(parts.uri.path()).ok_or(AppError::RouteNotFound)?;
    let query = parts.uri.query();
    match (&parts.method, route) {
        (&Method::GET, Route::Index) => index::index(),
        (&Method::GET, Route::Activities) => activities::list(state),
        (&Method::POST, Route::Signup(name)) => activities::signup(state, &name, query),
        (&Method::DELETE, Route::Unregister(name)) => activities::unregister(state, &name, query),
        (&Method::GET, Route::Static(segments)) => {
            static_files::serve(&state.static_dir, &segments).await
        }
        (_, route) => Err(AppError::MethodNotAllowed(route.allowed())),
    }
}

/// Entry point for every request, errors are turned into JSON responses here.
pub async fn handle<B>(
    state: AppState,
    request: Request<B>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, _) = request.into_parts();
    let span = info_span!("request", method = %parts.method, path = %parts.uri.path());
    async move {
        let response = dispatch(&state, &parts)
            .await
            .unwrap_or_else(AppError::into_response);
        debug!(status = %response.status(), "finished request");
        Ok(response)
    }
    .instrument(span)
    .await
}
