//! Response classification and body decoding.
//!
//! # Design
//! - Non-success bodies go through `ErrorBody::decode_message`, never a blind cast.
//! - 401 and 404 are logged here and otherwise treated like any other status.
//! - The token endpoint may answer with a JSON string, a `{ "token": .. }` object,
//!   or bare text.

use nds_api_models::ErrorBody;
use nds_core::{ApiError, ApiResult};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Turn a non-success response into an [`ApiError::Status`].
pub(crate) async fn classify_failure(operation: &'static str, response: Response) -> ApiError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    let message = ErrorBody::decode_message(&bytes);
    log_status(operation, status, message.as_deref());
    ApiError::Status {
        operation,
        status: status.as_u16(),
        message,
    }
}

fn log_status(operation: &'static str, status: StatusCode, message: Option<&str>) {
    match status {
        StatusCode::UNAUTHORIZED => {
            tracing::error!(operation, "401: re-authentication required");
        }
        StatusCode::NOT_FOUND => {
            tracing::warn!(operation, "404: resource not found");
        }
        _ => {
            tracing::debug!(
                operation,
                status = status.as_u16(),
                server_message = message,
                "request rejected"
            );
        }
    }
}

/// Read the whole body and decode it as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> ApiResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| ApiError::Transport {
            operation,
            detail: err.to_string(),
        })?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode {
        operation,
        detail: err.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenBody {
    Plain(String),
    Wrapped { token: String },
}

/// Extract a token from a `/token` response body.
pub(crate) fn decode_token(operation: &'static str, bytes: &[u8]) -> ApiResult<String> {
    let token = match serde_json::from_slice::<TokenBody>(bytes) {
        Ok(TokenBody::Plain(token) | TokenBody::Wrapped { token }) => token,
        Err(_) => String::from_utf8(bytes.to_vec()).map_err(|err| ApiError::Decode {
            operation,
            detail: err.to_string(),
        })?,
    };
    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::Decode {
            operation,
            detail: "token response was empty".to_string(),
        });
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_accepts_json_string() {
        assert_eq!(
            decode_token("fetch_token", br#""eyJhbGciOi.x.y""#),
            Ok("eyJhbGciOi.x.y".to_string())
        );
    }

    #[test]
    fn token_accepts_wrapped_object() {
        assert_eq!(
            decode_token("fetch_token", br#"{"token":"abc"}"#),
            Ok("abc".to_string())
        );
    }

    #[test]
    fn token_accepts_bare_text() {
        assert_eq!(
            decode_token("fetch_token", b"eyJhbGciOi.x.y\n"),
            Ok("eyJhbGciOi.x.y".to_string())
        );
    }

    #[test]
    fn empty_token_is_a_decode_error() {
        assert!(matches!(
            decode_token("fetch_token", b"   "),
            Err(ApiError::Decode { .. })
        ));
        assert!(matches!(
            decode_token("fetch_token", br#""""#),
            Err(ApiError::Decode { .. })
        ));
    }
}
