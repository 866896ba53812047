//! Request body extractor with field-level JSON errors.
//!
//! `axum::Json` answers a body that does not fit the target type with a
//! plain-text 422. [`ValidJson`] reports the same failures as 400 JSON: a
//! value of the wrong type lands under its field name, just like the errors
//! from [`unitec_portal_core::validate_registration`].

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

use unitec_portal_core::ValidationErrors;

use crate::error::AppError;

/// JSON body extractor whose rejections are [`AppError`]s.
///
/// # Example
///
/// ```rust,ignore
/// async fn register(ValidJson(input): ValidJson<RegistrationInput>) -> impl IntoResponse {
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Err(AppError::UnsupportedMediaType);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        parse_body(&bytes).map(Self)
    }
}

/// Deserialize a JSON body, attributing type errors to the offending field.
fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let field = err
            .path()
            .iter()
            .find_map(|segment| match segment {
                Segment::Map { key } => Some(key.clone()),
                _ => None,
            })
            .unwrap_or_else(|| ValidationErrors::NON_FIELD.to_owned());

        body_error(&field, err.inner())
    })?;

    deserializer
        .end()
        .map_err(|err| body_error(ValidationErrors::NON_FIELD, &err))?;

    Ok(value)
}

fn body_error(field: &str, err: &serde_json::Error) -> AppError {
    let message = without_position(err);

    if err.is_data() {
        AppError::Validation(ValidationErrors::single(field, message))
    } else {
        AppError::BadRequest(format!("JSON parse error - {message}"))
    }
}

/// serde_json's message without the trailing " at line L column C".
fn without_position(err: &serde_json::Error) -> String {
    let message = err.to_string();
    let suffix = format!(" at line {} column {}", err.line(), err.column());

    message
        .strip_suffix(&suffix)
        .map_or_else(|| message.clone(), str::to_owned)
}

/// `application/json` or any `application/*+json` type.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence
        .strip_prefix("application/")
        .is_some_and(|subtype| subtype == "json" || subtype.ends_with("+json"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::NaiveDate;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Body {
        #[serde(default)]
        graduation_date: Option<NaiveDate>,
        #[serde(default)]
        student_id: Option<String>,
    }

    fn field_errors(bytes: &[u8]) -> serde_json::Value {
        match parse_body::<Body>(bytes).unwrap_err() {
            AppError::Validation(errors) => serde_json::to_value(errors).unwrap(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_type_errors_are_reported_under_their_field() {
        let errors = field_errors(br#"{"graduation_date": "2023-02-30"}"#);
        assert_eq!(
            errors,
            json!({ "graduation_date": ["input is out of range"] })
        );

        let errors = field_errors(br#"{"student_id": 1234567}"#);
        assert_eq!(
            errors,
            json!({ "student_id": ["invalid type: integer `1234567`, expected a string"] })
        );
    }

    #[test]
    fn test_syntax_errors_are_bad_requests() {
        assert!(matches!(
            parse_body::<Body>(b"{\"student_id\": "),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_body::<Body>(b"{} trailing"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_json_content_types() {
        let mut headers = HeaderMap::new();
        assert!(!is_json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/merge-patch+json"),
        );
        assert!(is_json_content_type(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json_content_type(&headers));
    }
}
