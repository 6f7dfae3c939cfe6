//! Request handlers.

pub(crate) mod data;
pub(crate) mod less;
pub(crate) mod pages;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use md5::{Digest, Md5};

/// Build a `200` response for freshly produced content, or `304` when the
/// client already holds the same bytes.
pub(crate) fn fresh_response(
    content: Vec<u8>,
    content_type: &str,
    headers: &HeaderMap,
) -> Response {
    let etag = compute_etag(&content);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        content,
    )
        .into_response()
}

/// Compute `ETag` from content.
///
/// Uses MD5 truncated to 64 bits (16 hex chars).
fn compute_etag(content: &[u8]) -> String {
    let hash = Md5::digest(content);
    format!("\"{}\"", &hex::encode(hash)[..16])
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_compute_etag_depends_on_content() {
        assert_ne!(compute_etag(b"argo"), compute_etag(b"lincoln"));
        assert_eq!(compute_etag(b"argo"), compute_etag(b"argo"));
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag(b"content");
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }

    #[test]
    fn test_fresh_response_not_modified() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_str(&compute_etag(b"body")).unwrap(),
        );
        let response = fresh_response(b"body".to_vec(), "text/plain", &headers);
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        let response = fresh_response(b"other".to_vec(), "text/plain", &headers);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    }
}
