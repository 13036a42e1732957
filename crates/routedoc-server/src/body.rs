//! JSON body parsing.
//!
//! Bodies are read up to a byte limit and parsed as strict JSON: the top level
//! must be an object or an array. A request without a body yields `None`.
//!
//! Compressed bodies are expected to be decompressed already; the router
//! does this for gzip and deflate, so the limit applies to decoded bytes.
//! Any other `Content-Encoding` besides `identity` is refused here.

use std::borrow::Cow;

use axum::body::{Body, HttpBody};
use axum::http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;

use crate::error::ApiError;

/// Why a body was refused before reaching the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BodyRejection {
    #[error("Body must have Content-Type application/json")]
    NotJson,

    #[error("Invalid JSON Charset")]
    UnsupportedCharset,

    #[error("Invalid JSON Content-Encoding")]
    UnsupportedEncoding,

    #[error("Invalid JSON Syntax")]
    InvalidSyntax,

    /// The body could not be read, including bodies over the limit.
    #[error("Internal server error")]
    Unreadable,
}

impl BodyRejection {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::NotJson | Self::UnsupportedCharset | Self::UnsupportedEncoding => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::InvalidSyntax => StatusCode::BAD_REQUEST,
            Self::Unreadable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            Self::NotJson | Self::UnsupportedCharset | Self::UnsupportedEncoding => {
                ApiError::UnsupportedMediaType { message }
            }
            Self::InvalidSyntax => ApiError::BadRequest { message },
            Self::Unreadable => ApiError::InternalError { details: None },
        }
        .into_response()
    }
}

/// Reads and parses a JSON body.
///
/// # Errors
///
/// Returns a [`BodyRejection`] when the body is present but not acceptable
/// JSON, or cannot be read within `limit` bytes.
pub async fn parse_json_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Option<Value>, BodyRejection> {
    if !has_body(headers, &body) {
        return Ok(None);
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !is_json_media_type(content_type) {
        return Err(BodyRejection::NotJson);
    }
    let charset = match charset(content_type) {
        Some(name) => Charset::parse(&name).ok_or(BodyRejection::UnsupportedCharset)?,
        None => Charset::Utf8,
    };
    if let Some(encoding) = headers.get(CONTENT_ENCODING) {
        if !encoding.as_bytes().eq_ignore_ascii_case(b"identity") {
            return Err(BodyRejection::UnsupportedEncoding);
        }
    }

    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        tracing::error!(error = %err, limit, "Failed to read request body");
        BodyRejection::Unreadable
    })?;
    if bytes.is_empty() {
        return Ok(None);
    }
    let text = charset.decode(&bytes).ok_or(BodyRejection::InvalidSyntax)?;

    // Strict mode: only objects and arrays at the top level.
    match text.iter().find(|byte| !byte.is_ascii_whitespace()) {
        Some(b'{' | b'[') => {}
        _ => return Err(BodyRejection::InvalidSyntax),
    }

    serde_json::from_slice(&text)
        .map(Some)
        .map_err(|_| BodyRejection::InvalidSyntax)
}

/// Charsets a JSON body may declare: the UTF family, minus UTF-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    Utf8,
    Utf16 { big_endian: bool },
    Utf32 { big_endian: bool },
}

impl Charset {
    /// Unmarked UTF-16 and UTF-32 are little-endian unless a byte order mark
    /// says otherwise.
    fn parse(name: &str) -> Option<Self> {
        match name {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "utf-16" | "utf-16le" | "utf16" | "utf16le" => Some(Self::Utf16 { big_endian: false }),
            "utf-16be" | "utf16be" => Some(Self::Utf16 { big_endian: true }),
            "utf-32" | "utf-32le" | "utf32" | "utf32le" => Some(Self::Utf32 { big_endian: false }),
            "utf-32be" | "utf32be" => Some(Self::Utf32 { big_endian: true }),
            _ => None,
        }
    }

    /// Re-encodes `bytes` as UTF-8, dropping any byte order mark. `None` if
    /// the bytes are not valid in this charset.
    fn decode(self, bytes: &[u8]) -> Option<Cow<'_, [u8]>> {
        match self {
            Self::Utf8 => Some(Cow::Borrowed(
                bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes),
            )),
            Self::Utf16 { big_endian } => {
                let (bytes, big_endian) = match bytes {
                    [0xFE, 0xFF, rest @ ..] => (rest, true),
                    [0xFF, 0xFE, rest @ ..] => (rest, false),
                    _ => (bytes, big_endian),
                };
                if bytes.len() % 2 != 0 {
                    return None;
                }
                let units = bytes.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if big_endian {
                        u16::from_be_bytes(pair)
                    } else {
                        u16::from_le_bytes(pair)
                    }
                });
                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .ok()
                    .map(|text| Cow::Owned(text.into_bytes()))
            }
            Self::Utf32 { big_endian } => {
                let (bytes, big_endian) = match bytes {
                    [0x00, 0x00, 0xFE, 0xFF, rest @ ..] => (rest, true),
                    [0xFF, 0xFE, 0x00, 0x00, rest @ ..] => (rest, false),
                    _ => (bytes, big_endian),
                };
                if bytes.len() % 4 != 0 {
                    return None;
                }
                bytes
                    .chunks_exact(4)
                    .map(|quad| {
                        let quad = [quad[0], quad[1], quad[2], quad[3]];
                        char::from_u32(if big_endian {
                            u32::from_be_bytes(quad)
                        } else {
                            u32::from_le_bytes(quad)
                        })
                    })
                    .collect::<Option<String>>()
                    .map(|text| Cow::Owned(text.into_bytes()))
            }
        }
    }
}

fn has_body(headers: &HeaderMap, body: &Body) -> bool {
    if headers.contains_key(TRANSFER_ENCODING) {
        return true;
    }
    match headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
    {
        Some(length) => length > 0,
        None => body.size_hint().exact() != Some(0),
    }
}

/// `application/json` or any `+json` suffix type.
fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || essence
            .split_once('/')
            .is_some_and(|(_, subtype)| subtype.ends_with("+json"))
}

fn charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    fn parse(headers: &HeaderMap, body: &'static str) -> Result<Option<Value>, BodyRejection> {
        parse_bytes(headers, body.as_bytes().to_vec())
    }

    fn parse_bytes(headers: &HeaderMap, body: Vec<u8>) -> Result<Option<Value>, BodyRejection> {
        tokio_test::block_on(parse_json_body(headers, Body::from(body), 1024))
    }

    fn utf16(text: &str, big_endian: bool) -> Vec<u8> {
        text.encode_utf16()
            .flat_map(|unit| {
                if big_endian {
                    unit.to_be_bytes()
                } else {
                    unit.to_le_bytes()
                }
            })
            .collect()
    }

    #[test]
    fn test_media_type_detection() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("Application/JSON; charset=utf-8"));
        assert!(is_json_media_type("application/vnd.api+json"));
        assert!(!is_json_media_type("text/plain"));
        assert!(!is_json_media_type(""));
    }

    #[test]
    fn test_charset_extraction() {
        assert_eq!(charset("application/json; charset=UTF-8").as_deref(), Some("utf-8"));
        assert_eq!(charset("application/json; charset=\"latin1\"").as_deref(), Some("latin1"));
        assert_eq!(charset("application/json"), None);
    }

    #[test]
    fn test_empty_body_is_absent() {
        assert_eq!(parse(&HeaderMap::new(), ""), Ok(None));
    }

    #[test]
    fn test_object_body_parses() {
        let headers = json_headers("application/json");
        assert_eq!(
            parse(&headers, r#"{"species":"dog"}"#),
            Ok(Some(serde_json::json!({ "species": "dog" })))
        );
        assert_eq!(parse(&headers, "{}"), Ok(Some(serde_json::json!({}))));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse(&json_headers("text/plain"), "{}"), Err(BodyRejection::NotJson));
        assert_eq!(
            parse(&json_headers("application/json; charset=latin1"), "{}"),
            Err(BodyRejection::UnsupportedCharset)
        );
        assert_eq!(
            parse(&json_headers("application/json"), "{not json"),
            Err(BodyRejection::InvalidSyntax)
        );
        assert_eq!(
            parse(&json_headers("application/json"), "\"scalar\""),
            Err(BodyRejection::InvalidSyntax)
        );

        assert_eq!(
            parse(&json_headers("application/json; charset=utf-7"), "{}"),
            Err(BodyRejection::UnsupportedCharset)
        );

        // Decompression happens in the router; raw compressed bytes are refused.
        let mut br = json_headers("application/json");
        br.insert(CONTENT_ENCODING, HeaderValue::from_static("br"));
        assert_eq!(parse(&br, "{}"), Err(BodyRejection::UnsupportedEncoding));

        let mut identity = json_headers("application/json");
        identity.insert(CONTENT_ENCODING, HeaderValue::from_static("identity"));
        assert_eq!(parse(&identity, "[]"), Ok(Some(serde_json::json!([]))));
    }

    #[test]
    fn test_utf_family_charsets_are_decoded() {
        let expected = Ok(Some(serde_json::json!({ "name": "café" })));
        let text = r#"{"name":"café"}"#;

        let headers = json_headers("application/json; charset=utf-16le");
        assert_eq!(parse_bytes(&headers, utf16(text, false)), expected);

        let headers = json_headers("application/json; charset=UTF-16BE");
        assert_eq!(parse_bytes(&headers, utf16(text, true)), expected);

        // A byte order mark overrides the default little-endian reading.
        let mut marked = vec![0xFE, 0xFF];
        marked.extend(utf16(text, true));
        let headers = json_headers("application/json; charset=utf-16");
        assert_eq!(parse_bytes(&headers, marked), expected);

        let utf32: Vec<u8> = text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect();
        let headers = json_headers("application/json; charset=utf-32");
        assert_eq!(parse_bytes(&headers, utf32), expected);

        let mut bom = vec![0xEF, 0xBB, 0xBF];
        bom.extend_from_slice(text.as_bytes());
        assert_eq!(parse_bytes(&json_headers("application/json"), bom), expected);
    }

    #[test]
    fn test_badly_encoded_body_is_a_syntax_error() {
        let headers = json_headers("application/json; charset=utf-16");
        assert_eq!(parse_bytes(&headers, b"{}}".to_vec()), Err(BodyRejection::InvalidSyntax));
    }

    #[test]
    fn test_oversized_body_is_unreadable() {
        let headers = json_headers("application/json");
        let body = Body::from(format!("[{}]", "1,".repeat(1024) + "1"));
        let result = tokio_test::block_on(parse_json_body(&headers, body, 64));
        assert_eq!(result, Err(BodyRejection::Unreadable));
        assert_eq!(BodyRejection::Unreadable.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
