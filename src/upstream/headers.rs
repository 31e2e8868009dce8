//! Request header whitelist.

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, USER_AGENT};

/// Inbound headers copied onto the upstream request, in this order.
/// Nothing else from the caller reaches the upstream.
pub const FORWARDED_REQUEST_HEADERS: [HeaderName; 4] = [
    AUTHORIZATION,
    USER_AGENT,
    ACCEPT,
    ACCEPT_LANGUAGE,
];

/// Whitelisted headers whose repeated values are joined with `, `.
/// For the others only the first value is kept.
const LIST_HEADERS: [HeaderName; 2] = [ACCEPT, ACCEPT_LANGUAGE];

/// Copy the whitelisted headers that are present on `inbound`.
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(FORWARDED_REQUEST_HEADERS.len() + 2);
    for name in &FORWARDED_REQUEST_HEADERS {
        let value = if LIST_HEADERS.contains(name) {
            joined_value(inbound, name)
        } else {
            inbound.get(name).cloned()
        };
        if let Some(value) = value {
            headers.insert(name.clone(), value);
        }
    }
    headers
}

fn joined_value(inbound: &HeaderMap, name: &HeaderName) -> Option<HeaderValue> {
    let mut values = inbound.get_all(name).iter();
    let first = values.next()?;

    let mut joined = first.as_bytes().to_vec();
    for value in values {
        joined.extend_from_slice(b", ");
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_bytes(&joined).ok().or_else(|| Some(first.clone()))
}
