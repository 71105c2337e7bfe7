//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level. If a body
/// is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated and the
/// full body logged at the `debug` level. Password fields in JSON request
/// bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    let is_json = headers
        .headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"));

    if is_json {
        let display_text = redact_json_field(&body_text, "password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Replace the string value of `field_name` in a JSON object with
/// asterisks.
///
/// The body is scanned textually rather than parsed, so malformed JSON
/// passes through unchanged and still gets logged.
fn redact_json_field(body_text: &str, field_name: &str) -> String {
    let needle = format!("\"{field_name}\"");

    let Some(key_start) = body_text.find(&needle) else {
        return body_text.to_string();
    };

    let after_key = key_start + needle.len();
    let Some(colon_offset) = body_text[after_key..].find(':') else {
        return body_text.to_string();
    };

    let Some(value_offset) = body_text[after_key + colon_offset..].find('"') else {
        return body_text.to_string();
    };
    let value_start = after_key + colon_offset + value_offset + 1;

    let mut value_end = None;
    let mut escaped = false;
    for (i, c) in body_text[value_start..].char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                value_end = Some(value_start + i);
                break;
            }
            _ => escaped = false,
        }
    }

    let Some(value_end) = value_end else {
        return body_text.to_string();
    };

    format!(
        "{}********{}",
        &body_text[..value_start],
        &body_text[value_end..]
    )
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

/// The maximum number of body bytes logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Take at most `limit` bytes from the front of `body` without splitting a
/// multi-byte character. Category bodies carry emoji icons, so byte 64 can
/// land mid-character.
fn truncate_to_char_boundary(body: &str, mut limit: usize) -> &str {
    if body.len() <= limit {
        return body;
    }

    while !body.is_char_boundary(limit) {
        limit -= 1;
    }

    &body[..limit]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate_to_char_boundary(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate_to_char_boundary(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod truncation_tests {
    use super::{LOG_BODY_LENGTH_LIMIT, truncate_to_char_boundary};

    #[test]
    fn short_bodies_pass_through_whole() {
        let body = r#"{"name":"Pets"}"#;

        assert_eq!(truncate_to_char_boundary(body, LOG_BODY_LENGTH_LIMIT), body);
    }

    #[test]
    fn ascii_bodies_truncate_at_the_limit() {
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT + 10);

        let truncated = truncate_to_char_boundary(&body, LOG_BODY_LENGTH_LIMIT);

        assert_eq!(truncated.len(), LOG_BODY_LENGTH_LIMIT);
    }

    #[test]
    fn truncation_backs_off_a_limit_inside_an_emoji() {
        // 63 ASCII bytes followed by a four-byte cat puts the limit inside
        // the cat.
        let body = format!("{}🐈", "a".repeat(LOG_BODY_LENGTH_LIMIT - 1));
        assert!(!body.is_char_boundary(LOG_BODY_LENGTH_LIMIT));

        let truncated = truncate_to_char_boundary(&body, LOG_BODY_LENGTH_LIMIT);

        assert_eq!(truncated, "a".repeat(LOG_BODY_LENGTH_LIMIT - 1));
    }
}
