//! Request extractors that report failures as `BackofficeError`s.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use validator::{Validate, ValidationErrors};
use crate::uploads::UploadedFile;
use crate::BackofficeError;

/// JSON body that has also passed its `validator` rules.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BackofficeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| BackofficeError::Validation(e.body_text()))?;
        value.validate().map_err(|e| BackofficeError::Validation(describe(&e)))?;
        Ok(Self(value))
    }
}

/// First failing rule, by field name, as a readable sentence.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|err| match &err.message {
                Some(message) => message.to_string(),
                None if err.code == "required" => format!("{field} is required"),
                None => format!("{field} is invalid"),
            })
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// Flat form body, from either `multipart/form-data` or a JSON object.
/// File parts are kept by field name; JSON scalars are stringified.
#[derive(Debug, Default)]
pub struct FormInput {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormInput {
    /// Trimmed, non-empty text value.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, key: &str) -> Option<UploadedFile> { self.files.remove(key) }

    fn from_json(object: serde_json::Map<String, Value>) -> Self {
        let fields = object.into_iter().filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        }).collect();
        Self { fields, files: HashMap::new() }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, BackofficeError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| BackofficeError::Validation(format!("Multipart error: {e}")))? {
            let Some(name) = field.name().map(str::to_string) else { continue };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(|e| BackofficeError::Validation(format!("Read error: {e}")))?;
                    // Browsers send an empty part when no file was picked.
                    if file_name.is_empty() && bytes.is_empty() { continue; }
                    form.files.insert(name, UploadedFile { file_name, bytes: bytes.to_vec() });
                }
                None => {
                    let text = field.text().await.map_err(|e| BackofficeError::Validation(format!("Read error: {e}")))?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = BackofficeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req.headers().get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));
        if is_multipart {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| BackofficeError::Validation(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(object) = Json::<serde_json::Map<String, Value>>::from_request(req, state).await
                .map_err(|e| BackofficeError::Validation(e.body_text()))?;
            Ok(Self::from_json(object))
        }
    }
}
