use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Deserialize;

use super::json_response;
use crate::error::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

impl EmailQuery {
    fn parse(query: Option<&str>) -> Result<Self, AppError> {
        Ok(serde_urlencoded::from_str(query.unwrap_or_default())?)
    }
}

pub fn list(state: &AppState) -> Result<Response<Full<Bytes>>, AppError> {
    json_response(StatusCode::OK, &state.roster.list_all())
}

pub fn signup(
    state: &AppState,
    activity: &str,
    query: Option<&str>,
) -> Result<Response<Full<Bytes>>, AppError> {
    let EmailQuery { email } = EmailQuery::parse(query)?;
    let result = state.roster.enroll(activity, &email)?;
    json_response(StatusCode::OK, &result)
}

pub fn unregister(
    state: &AppState,
    activity: &str,
    query: Option<&str>,
) -> Result<Response<Full<Bytes>>, AppError> {
    let EmailQuery { email } = EmailQuery::parse(query)?;
    let result = state.roster.unenroll(activity, &email)?;
    json_response(StatusCode::OK, &result)
}
