//! JSON boundary codec.
//!
//! Wire format (field names are stable):
//!
//! ```json
//! {"status":404,"code":"USER_NOT_FOUND","message":"user 7 missing","dev_message":"..."}
//! ```
//!
//! | Field         | Type    | Encode                         | Decode                         |
//! |---------------|---------|--------------------------------|--------------------------------|
//! | `status`      | integer | chain classification           | absent/invalid → 500           |
//! | `code`        | string  | first app code, omitted if none| optional                       |
//! | `message`     | string  | head message                   | required                       |
//! | `dev_message` | string  | head dev message, omitted if none; never in `encode_public` | optional |
//!
//! Only the head crosses: the stack and the rest of the chain are
//! dropped. Unknown fields are ignored on decode.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::stack::Stack;
use crate::{CError, HttpStatus};

/// App code given to the error produced when a payload cannot be decoded.
pub const DECODE_ERROR: &str = "DECODE_ERROR";

/// Why a payload could not be decoded.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid error payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid error payload: expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Serialize)]
struct WireOut<'a> {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dev_message: Option<&'a str>,
}

#[derive(Deserialize)]
struct WireIn {
    #[serde(default)]
    status: Option<serde_json::Value>,
    #[serde(default)]
    code: Option<String>,
    message: String,
    #[serde(default)]
    dev_message: Option<String>,
}

impl CError {
    fn wire(&self, with_dev: bool) -> WireOut<'_> {
        WireOut {
            status: self.classify().code(),
            code: self.code(),
            message: self.message(),
            dev_message: if with_dev { self.dev_message() } else { None },
        }
    }
}

/// Public boundary form: no `dev_message`.
impl Serialize for CError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.wire(false).serialize(serializer)
    }
}

/// Serialize the head of `err` for service-to-service transport,
/// including `dev_message`.
///
/// `message` and `dev_message` are the head's own. `status` is the
/// chain's classification and `code` the first app code found walking
/// down the chain, so a wrapped error still reports its root's code:
///
/// ```
/// use cerror::{decode, encode, CError, HttpStatus};
/// let err = CError::coded(HttpStatus::NotFound, "U", "user missing").wrap("loading");
/// assert_eq!(err.app_code(), None);
/// assert_eq!(decode(&encode(&err)).app_code(), Some("U"));
/// ```
pub fn encode(err: &CError) -> Vec<u8> {
    to_bytes(&err.wire(true))
}

/// Serialize the head of `err` for a response an external caller sees.
/// Same fields as [`encode`], except `dev_message` is never included.
pub fn encode_public(err: &CError) -> Vec<u8> {
    to_bytes(&err.wire(false))
}

fn to_bytes(wire: &WireOut<'_>) -> Vec<u8> {
    // A struct of strings and an integer always serializes; an empty
    // payload decodes to DECODE_ERROR should that ever change.
    serde_json::to_vec(wire).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to encode error payload");
        Vec::new()
    })
}

/// Strict decode: parse failures are returned.
#[track_caller]
pub fn try_decode(payload: &[u8]) -> Result<CError, CodecError> {
    // Derived struct impls also accept a positional array.
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject(json_kind(&value)));
    }
    let wire: WireIn = serde_json::from_value(value)?;
    let status = wire
        .status
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .map(HttpStatus::from_code)
        .unwrap_or(HttpStatus::Internal);

    let mut err = CError::build(Some(status), wire.message, Stack::capture());
    if let Some(code) = wire.code {
        err = err.with_code(code);
    }
    if let Some(dev) = wire.dev_message {
        err = err.with_dev_message(dev);
    }
    Ok(err)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Decode a payload. Never fails: malformed input yields an `Internal`
/// error with app code [`DECODE_ERROR`] and the parse failure as message.
///
/// Either way the stack is captured at the decode site.
///
/// ```
/// use cerror::{decode, HttpStatus};
/// let err = decode(b"not json");
/// assert_eq!(err.classify(), HttpStatus::Internal);
/// assert_eq!(err.app_code(), Some("DECODE_ERROR"));
/// ```
#[track_caller]
pub fn decode(payload: &[u8]) -> CError {
    match try_decode(payload) {
        Ok(err) => err,
        Err(e) => {
            tracing::debug!(error = %e, len = payload.len(), "falling back to {}", DECODE_ERROR);
            CError::build(Some(HttpStatus::Internal), e.to_string(), Stack::capture())
                .with_code(DECODE_ERROR)
        }
    }
}
