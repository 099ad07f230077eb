//! Maps raw HTTP responses onto success payloads or classified errors.
//!
//! | Status    | Outcome                                  |
//! |-----------|------------------------------------------|
//! | 200..=299 | body handed to the caller                |
//! | 401       | [`Error::Authentication`]                |
//! | 404       | [`Error::NotFound`] with the endpoint    |
//! | 422       | [`Error::Validation`] with the body      |
//! | 429       | [`Error::RateLimit`] with `Retry-After`  |
//! | other     | [`Error::Api`] with status and body      |

use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;

use super::transport::RawResponse;
use crate::error::{Error, Result};

/// Delay used when a 429 carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Classifies `response` to a request for `endpoint`.
pub fn classify(response: RawResponse, endpoint: &str) -> Result<Vec<u8>> {
    match response.status {
        200..=299 => Ok(response.body),
        401 => Err(Error::Authentication("invalid API key".to_string())),
        404 => Err(Error::NotFound(endpoint.to_string())),
        422 => Err(Error::Validation(response.body_text())),
        429 => Err(Error::RateLimit {
            retry_after: retry_after_secs(&response),
        }),
        status => Err(Error::Api {
            status,
            message: response.body_text(),
        }),
    }
}

/// Seconds from the `Retry-After` header, or [`DEFAULT_RETRY_AFTER_SECS`]
/// when the header is absent or not a whole number.
pub fn retry_after_secs(response: &RawResponse) -> u64 {
    response
        .headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Decodes a success body. An empty body decodes as JSON `null`.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body)
        .map_err(|e| Error::connection(format!("failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn rate_limited(retry_after: &'static str) -> RawResponse {
        RawResponse::new(429, "").with_header(RETRY_AFTER, HeaderValue::from_static(retry_after))
    }

    #[test]
    fn test_classify_success_range() {
        for status in [200, 201, 204, 299] {
            let body = classify(RawResponse::new(status, "{}"), "/x").unwrap();
            assert_eq!(body, b"{}");
        }
    }

    #[test]
    fn test_classify_unauthorized() {
        let err = classify(RawResponse::new(401, "nope"), "/agents").unwrap_err();
        assert_eq!(err, Error::Authentication("invalid API key".to_string()));
    }

    #[test]
    fn test_classify_not_found_carries_endpoint() {
        let err = classify(RawResponse::new(404, "gone"), "/agents/a1").unwrap_err();
        assert_eq!(err, Error::NotFound("/agents/a1".to_string()));
    }

    #[test]
    fn test_classify_validation_carries_body() {
        let err = classify(RawResponse::new(422, r#"{"error":"title required"}"#), "/tasks")
            .unwrap_err();
        assert_eq!(
            err,
            Error::Validation(r#"{"error":"title required"}"#.to_string())
        );
    }

    #[test]
    fn test_classify_rate_limit_reads_retry_after() {
        let err = classify(rate_limited("12"), "/tasks").unwrap_err();
        assert_eq!(err, Error::RateLimit { retry_after: 12 });
    }

    #[test]
    fn test_retry_after_defaults() {
        assert_eq!(retry_after_secs(&RawResponse::new(429, "")), 1);

        assert_eq!(retry_after_secs(&rate_limited("soon")), 1);
        assert_eq!(retry_after_secs(&rate_limited(" 4 ")), 4);

        let opaque = RawResponse::new(429, "")
            .with_header(RETRY_AFTER, HeaderValue::from_bytes(b"\xff3").unwrap());
        assert_eq!(retry_after_secs(&opaque), 1);
    }

    #[test]
    fn test_classify_other_statuses_are_api_errors() {
        for status in [400, 403, 409, 500, 502, 503] {
            let err = classify(RawResponse::new(status, "boom"), "/x").unwrap_err();
            assert_eq!(
                err,
                Error::Api {
                    status,
                    message: "boom".to_string()
                }
            );
        }
    }

    #[test]
    fn test_decode_json_success() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Version {
            version: String,
        }

        let decoded: Version = decode_json(br#"{"version":"1.2.3"}"#).unwrap();
        assert_eq!(decoded.version, "1.2.3");
    }

    #[test]
    fn test_decode_json_malformed_is_connection_error() {
        let err = decode_json::<serde_json::Value>(b"<html>").unwrap_err();
        assert!(matches!(err, Error::Connection(ref m) if m.starts_with("failed to parse response")));
    }

    #[test]
    fn test_decode_json_empty_body_is_null() {
        let value: serde_json::Value = decode_json(b"").unwrap();
        assert!(value.is_null());

        assert!(decode_json::<()>(b"  ").is_ok());
        assert!(decode_json::<Option<u32>>(b"").unwrap().is_none());
    }
}
