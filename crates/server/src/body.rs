use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Json,
};
use serde_json::Value;
use shared::{
    error::{ApiError, ErrorCode, ValidationError},
    protocol::{ErrorBody, ProductPayload},
};

use crate::HttpError;

pub(crate) struct ProductBody(pub(crate) ProductPayload);

#[async_trait]
impl<S> FromRequest<S> for ProductBody
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| bad_request(e.body_text()))?;
            return read_multipart(multipart).await.map(ProductBody);
        }

        let Json(payload) = Json::<ProductPayload>::from_request(req, state)
            .await
            .map_err(|e| bad_request(e.body_text()))?;
        Ok(ProductBody(payload))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductPayload, HttpError> {
    let mut payload = ProductPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_some() {
            return Err(bad_request(
                ValidationError::UnsupportedUpload(name).to_string(),
            ));
        }

        let text = field.text().await.map_err(|e| bad_request(e.body_text()))?;
        // blank numeric inputs mean "not provided" on a form
        let number = (!text.trim().is_empty()).then(|| Value::String(text.clone()));
        match name.as_str() {
            "nome" => payload.nome = Some(text),
            "quantidade" => payload.quantidade = number,
            "preco" => payload.preco = number,
            "descricao" => payload.descricao = Some(text),
            "imagem" => payload.imagem = Some(text),
            _ => {}
        }
    }

    Ok(payload)
}

fn bad_request(message: impl Into<String>) -> HttpError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::from(ApiError::new(ErrorCode::Validation, message))),
    )
}
