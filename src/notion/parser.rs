// src/notion/parser.rs
//! Turns raw API responses into typed values or typed errors.

use super::client::ApiResponse;
use super::responses::NotionErrorBody;
use crate::error::{AppError, NotionErrorCode};

/// Maximum characters of a response body quoted in parse errors.
const BODY_PREVIEW_LENGTH: usize = 500;

/// Parse any Notion API response: success bodies into `T`, error bodies
/// into [`AppError::NotionService`].
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if (200..300).contains(&result.status) {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!("{} (body: {})", e, preview(body)))
    })
}

fn parse_error(body: &str, status: u16, url: &str) -> AppError {
    if let Ok(notion_error) = serde_json::from_str::<NotionErrorBody>(body) {
        return AppError::NotionService {
            code: NotionErrorCode::from_api_response(&notion_error.code),
            message: notion_error.message,
            status,
        };
    }

    AppError::NotionService {
        code: NotionErrorCode::from_http_status(status),
        message: format!("HTTP {} from {}", status, url),
        status,
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::responses::NotionUser;

    fn response(status: u16, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status,
            url: "https://api.notion.com/v1/users/me".to_string(),
        }
    }

    #[test]
    fn success_body_is_parsed() {
        let user: NotionUser =
            parse_api_response(response(200, r#"{"id": "u1", "type": "bot"}"#)).unwrap();
        assert_eq!(user.id, "u1");
    }

    #[test]
    fn notion_error_envelope_becomes_typed_error() {
        let err = parse_api_response::<NotionUser>(response(
            401,
            r#"{"object":"error","status":401,"code":"unauthorized","message":"API token is invalid."}"#,
        ))
        .unwrap_err();

        match err {
            AppError::NotionService {
                code,
                message,
                status,
            } => {
                assert_eq!(code, NotionErrorCode::Unauthorized);
                assert_eq!(message, "API token is invalid.");
                assert_eq!(status, 401);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn opaque_error_body_falls_back_to_status() {
        let err = parse_api_response::<NotionUser>(response(502, "<html>bad gateway</html>"))
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::NotionService {
                code: NotionErrorCode::HttpStatus(502),
                ..
            }
        ));
    }

    #[test]
    fn malformed_success_body_is_reported() {
        let err = parse_api_response::<NotionUser>(response(200, "{not json")).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }
}
