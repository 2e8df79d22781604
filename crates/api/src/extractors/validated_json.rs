//! JSON extractor with automatic validation using the validator crate.

use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON body that has passed `validator::Validate`.
///
/// Malformed JSON and failed validation both reject with `400`. Validation
/// failures carry per-field details.
///
/// ```ignore
/// async fn create(ValidatedJson(input): ValidatedJson<CreateTag>) -> AppResult<...> { ... }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        data.validate().map_err(|e| AppError::Validation {
            message: "Request validation failed".into(),
            details: field_details(&e),
        })?;

        Ok(ValidatedJson(data))
    }
}

/// `{ field: [{ code, message, params }] }`, nested structs flattened with dots.
fn field_details(errors: &ValidationErrors) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    collect(errors, "", &mut out);
    serde_json::Value::Object(out)
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut serde_json::Map<String, serde_json::Value>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages: Vec<serde_json::Value> = list
                    .iter()
                    .map(|err| {
                        serde_json::json!({
                            "code": err.code,
                            "message": err.message,
                            "params": err.params,
                        })
                    })
                    .collect();
                out.insert(key, serde_json::Value::Array(messages));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &key, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{key}[{index}]"), out);
                }
            }
        }
    }
}
