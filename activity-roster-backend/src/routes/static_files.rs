use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use headers::ContentType;
use http::{Response, StatusCode};
use http_body_util::Full;
use mime::Mime;
use percent_encoding::percent_decode_str;

use crate::error::AppError;
use crate::ResponseTypedHeaderExt as _;

fn content_type(path: &Path) -> Mime {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("html" | "htm") => mime::TEXT_HTML_UTF_8,
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("json") => mime::APPLICATION_JSON,
        Some("txt") => mime::TEXT_PLAIN_UTF_8,
        Some("svg") => mime::IMAGE_SVG,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Maps the segments after `/static/` to a path inside `root`. Anything that
/// could step outside of `root` yields `None`.
fn resolve(root: &Path, segments: &[&str]) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in segments {
        let segment = percent_decode_str(segment).decode_utf8().ok()?;
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['/', '\\', '\0'])
        {
            return None;
        }
        path.push(&*segment);
    }
    Some(path)
}

pub async fn serve(root: &Path, segments: &[&str]) -> Result<Response<Full<Bytes>>, AppError> {
    let path = resolve(root, segments).ok_or(AppError::RouteNotFound)?;
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Err(AppError::RouteNotFound),
        Err(error) if error.kind() == ErrorKind::NotFound => return Err(AppError::RouteNotFound),
        Err(error) => return Err(error.into()),
    }
    let contents = tokio::fs::read(&path).await?;
    Ok(Response::builder()
        .status(StatusCode::OK)
        .typed_header(ContentType::from(content_type(&path)))
        .body(Full::new(Bytes::from(contents)))?)
}
