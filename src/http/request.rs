//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID for log correlation
//! - Turn the inbound body into the JSON value that is forwarded
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, never forwarded
//! - Body parsing follows the content type: JSON, urlencoded form, or nothing
//! - Body size limits come from `DefaultBodyLimit`, enforced while buffering

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};

use crate::http::response::ApiError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that stamps every inbound request with a UUID `x-request-id`
/// unless the caller already supplied one.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Read the request ID set by [`request_id_layer`].
pub fn request_id(request: &axum::http::Request<Body>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// How an inbound body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    /// Anything else: the body is ignored and `{}` is forwarded.
    Ignored,
}

impl BodyKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return BodyKind::Ignored;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" {
            BodyKind::Json
        } else if essence == "application/x-www-form-urlencoded" {
            BodyKind::Form
        } else {
            BodyKind::Ignored
        }
    }
}

/// The JSON value of a chat request body.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatBody(pub Value);

impl<S> FromRequest<S> for ChatBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = BodyKind::from_content_type(
            req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        );

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Internal(e.body_text()))?;

        let value = match kind {
            BodyKind::Json => parse_json(&bytes)?,
            BodyKind::Form => parse_form(&bytes),
            BodyKind::Ignored => Value::Object(Map::new()),
        };
        Ok(ChatBody(value))
    }
}

/// Parse a JSON body. Only objects and arrays are accepted at the top level;
/// a zero-length body counts as `{}`.
pub fn parse_json(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| ApiError::Internal(e.to_string()))?;
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        other => Err(ApiError::Internal(format!(
            "request body must be a JSON object or array, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Deepest bracket nesting decoded from a form key; anything past it stays
/// a literal key segment.
const FORM_KEY_DEPTH: usize = 5;

/// Decode an urlencoded form into an object.
///
/// `a[b]=c` nests as `{"a":{"b":"c"}}` and `a[]=c` appends to an array.
/// Repeated keys become arrays.
pub fn parse_form(bytes: &[u8]) -> Value {
    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        let (root, path) = split_form_key(&key);
        let slot = fields.entry(root.to_owned()).or_insert(Value::Null);
        insert_form_value(slot, &path, Value::String(value.into_owned()));
    }
    Value::Object(fields)
}

/// Split `a[b][]` into `("a", ["b", ""])`. Keys without a well-formed
/// bracket suffix are returned whole.
fn split_form_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[').filter(|&i| i > 0) else {
        return (key, Vec::new());
    };

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while segments.len() < FORM_KEY_DEPTH && rest.starts_with('[') {
        let Some(close) = rest.find(']') else { break };
        segments.push(&rest[1..close]);
        rest = &rest[close + 1..];
    }

    if segments.is_empty() {
        return (key, segments);
    }
    if !rest.is_empty() {
        segments.push(rest);
    }
    (&key[..open], segments)
}

fn insert_form_value(slot: &mut Value, path: &[&str], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        merge_form_value(slot, value);
        return;
    };

    if segment.is_empty() {
        let mut child = Value::Null;
        insert_form_value(&mut child, rest, value);
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(items) => items.push(child),
            existing => merge_form_value(existing, child),
        }
        return;
    }

    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => {
            let child = map.entry((*segment).to_owned()).or_insert(Value::Null);
            insert_form_value(child, rest, value);
        }
        existing => {
            let mut child = Value::Null;
            insert_form_value(&mut child, path, value);
            merge_form_value(existing, child);
        }
    }
}

/// Store `value` in `slot`, turning a second value into an array.
fn merge_form_value(slot: &mut Value, value: Value) {
    if slot.is_null() {
        *slot = value;
        return;
    }
    match slot {
        Value::Array(items) => items.push(value),
        existing => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
