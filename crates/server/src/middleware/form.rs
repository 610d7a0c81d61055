//! Form body extractor.
//!
//! Browsers post the account and item forms either URL-encoded or as
//! `multipart/form-data` (a `FormData` object). [`FormData`] accepts both and
//! deserializes the text fields into the same form type.

use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Form extractor for URL-encoded and multipart bodies.
///
/// Multipart file parts are skipped; every field the form types read is text.
///
/// # Example
///
/// ```rust,ignore
/// async fn create(FormData(form): FormData<ItemForm>) -> String {
///     form.item_name
/// }
/// ```
#[derive(Debug)]
pub struct FormData<T>(pub T);

impl<T, S> FromRequest<S> for FormData<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidForm(e.body_text()))?;
            return Ok(Self(value));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidForm(e.body_text()))?;

        let mut fields = Map::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidForm(e.body_text()))?
        {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let text = field
                .text()
                .await
                .map_err(|e| AppError::InvalidForm(e.body_text()))?;
            fields.insert(name, Value::String(text));
        }

        serde_json::from_value(Value::Object(fields))
            .map(Self)
            .map_err(|e| AppError::InvalidForm(format!("Failed to deserialize form body: {e}")))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}
