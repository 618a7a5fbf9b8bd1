//! Total size extraction utilities.
//!
//! This module reads the total-size hint of a download from the response
//! metadata, supporting both Content-Length and Content-Range headers.

use crate::download::Total;

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE};

/// Extract the number of body bytes announced by the response headers.
///
/// `Content-Length` is used when present. A partial response without it
/// falls back to the span of its `Content-Range`, since the body carries only
/// that span and not the full resource.
///
/// # Example
///
/// ```rust
/// use haul::download::Total;
/// use haul::utils::total_from_headers;
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2048"));
/// assert_eq!(total_from_headers(&headers), Total::Known(2048));
/// assert_eq!(total_from_headers(&HeaderMap::new()), Total::Unknown);
/// ```
pub fn total_from_headers(headers: &HeaderMap) -> Total {
    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    content_length
        .or_else(|| {
            headers
                .get(CONTENT_RANGE)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_content_range_span)
        })
        .into()
}

/// Parse a Content-Range header to extract the length of the carried span.
///
/// Content-Range header format: "bytes start-end/total", where `end` is
/// inclusive and `total` may be `*`.
///
/// # Example
///
/// ```rust
/// use haul::utils::parse_content_range_span;
///
/// assert_eq!(parse_content_range_span("bytes 0-1023/2048"), Some(1024));
/// assert_eq!(parse_content_range_span("bytes 1024-2047/*"), Some(1024));
/// ```
pub fn parse_content_range_span(content_range: &str) -> Option<u64> {
    let range = content_range.trim().strip_prefix("bytes")?.trim_start();
    let (span, _total) = range.split_once('/')?;
    let (start, end) = span.split_once('-')?;
    let start = start.trim().parse::<u64>().ok()?;
    let end = end.trim().parse::<u64>().ok()?;
    end.checked_sub(start).map(|len| len + 1)
}
