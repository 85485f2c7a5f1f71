use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{auth::User, error::ApiError};

/// The standardized `{ success, message, data }` wrapper some API
/// deployments put around their payloads.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful.
    #[serde(default)]
    pub success: bool,
    /// A message describing the result (mostly for errors or confirmations).
    #[serde(default)]
    pub message: Option<String>,
    /// The actual data payload.
    pub data: Option<T>,
}

impl ApiResponse<Value> {
    /// A body is an envelope when it carries `data`, or reports
    /// `"success": false` without any.
    fn is_envelope(body: &Value) -> bool {
        body.get("data").is_some() || body.get("success") == Some(&Value::Bool(false))
    }
}

fn decode_error(e: serde_json::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

/// Decodes a success body, unwrapping the envelope when present.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let body: Value = serde_json::from_slice(bytes).map_err(decode_error)?;
    if !ApiResponse::<Value>::is_envelope(&body) {
        return serde_json::from_value(body).map_err(decode_error);
    }

    let envelope: ApiResponse<Value> = serde_json::from_value(body).map_err(decode_error)?;
    match envelope.data {
        Some(data) => serde_json::from_value(data).map_err(decode_error),
        None => Err(ApiError::Decode(
            envelope
                .message
                .unwrap_or_else(|| "response carried no data".to_string()),
        )),
    }
}

/// Error payload. Servers send `{ "message": ... }`, sometimes `{ "error": ... }`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn message_from(bytes: &[u8]) -> Option<String> {
        let body: ErrorBody = serde_json::from_slice(bytes).ok()?;
        body.message
            .or(body.error)
            .filter(|message| !message.trim().is_empty())
    }
}

/// Authoritative like state returned by `POST /api/tales/{id}/like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub likes: u32,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_bare_payload() {
        let status: LikeStatus = decode(br#"{"likes":4,"isLiked":true}"#).unwrap();
        assert_eq!(
            status,
            LikeStatus {
                likes: 4,
                is_liked: true
            }
        );
    }

    #[test]
    fn decodes_enveloped_payload() {
        let status: LikeStatus =
            decode(br#"{"success":true,"data":{"likes":1,"isLiked":false}}"#).unwrap();
        assert_eq!(status.likes, 1);
        assert!(!status.is_liked);
    }

    #[test]
    fn empty_envelope_is_a_decode_error() {
        let err = decode::<LikeStatus>(br#"{"success":false,"message":"nope"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(message) if message == "nope"));
    }

    #[test]
    fn bare_body_with_a_success_flag_is_not_an_envelope() {
        let status: LikeStatus = decode(br#"{"success":true,"likes":4,"isLiked":true}"#).unwrap();
        assert_eq!(status.likes, 4);
        assert!(status.is_liked);
    }

    #[test]
    fn null_data_is_a_decode_error() {
        let err = decode::<LikeStatus>(br#"{"success":true,"data":null}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(message) if message == "response carried no data"));
    }

    #[test]
    fn decode_errors_name_the_offending_field() {
        let body = br#"[{"_id":"a","title":"T","content":"c","topic":"x","childAge":"5-8","mood":"grumpy","isPublic":true,"createdAt":"2024-01-01T00:00:00Z"}]"#;
        let err = decode::<Vec<crate::tales::Tale>>(body).unwrap_err();
        assert!(matches!(&err, ApiError::Decode(message) if message.contains("grumpy")));

        let err = decode::<LikeStatus>(br#"{"success":true,"data":{"likes":"many"}}"#).unwrap_err();
        assert!(matches!(&err, ApiError::Decode(message) if message.contains("invalid type")));
    }

    #[test]
    fn error_body_prefers_message() {
        assert_eq!(
            ErrorBody::message_from(br#"{"success":false,"message":"Tale not found"}"#),
            Some("Tale not found".to_string())
        );
        assert_eq!(
            ErrorBody::message_from(br#"{"error":"Rate limited"}"#),
            Some("Rate limited".to_string())
        );
        assert_eq!(ErrorBody::message_from(b"<html>502</html>"), None);
        assert_eq!(ErrorBody::message_from(br#"{"message":"  "}"#), None);
    }
}
