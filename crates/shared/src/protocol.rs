use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{parse_price, parse_quantity, Amount, ProductDraft},
    error::{ApiError, ErrorCode, ValidationError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "erro")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl From<ApiError> for ErrorBody {
    fn from(value: ApiError) -> Self {
        Self {
            error: value.message,
            code: Some(value.code),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub mensagem: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub quantidade: Option<Value>,
    #[serde(default)]
    pub preco: Option<Value>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub imagem: Option<String>,
}

impl ProductPayload {
    pub fn into_draft(self) -> Result<ProductDraft, ValidationError> {
        let nome = self.nome.unwrap_or_default();
        if nome.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }

        let amount = match (self.quantidade, self.preco) {
            (Some(quantidade), _) if !quantidade.is_null() => Amount::Quantity {
                quantidade: quantity_from_value(&quantidade)?,
            },
            (_, Some(preco)) if !preco.is_null() => Amount::Price {
                preco: price_from_value(&preco)?,
            },
            _ => return Err(ValidationError::MissingAmount),
        };

        ProductDraft::new(
            &nome,
            amount,
            self.descricao.as_deref(),
            self.imagem.as_deref(),
        )
    }
}

fn quantity_from_value(value: &Value) -> Result<u64, ValidationError> {
    match value {
        Value::Number(n) => {
            if let Some(q) = n.as_u64() {
                Ok(q)
            } else if n.as_i64().is_some() {
                Err(ValidationError::NegativeQuantity)
            } else {
                Err(ValidationError::InvalidQuantity(n.to_string()))
            }
        }
        Value::String(raw) => parse_quantity(raw),
        other => Err(ValidationError::InvalidQuantity(other.to_string())),
    }
}

fn price_from_value(value: &Value) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(p) if p < 0.0 => Err(ValidationError::NegativePrice),
            Some(p) => Ok(p),
            None => Err(ValidationError::InvalidPrice(n.to_string())),
        },
        Value::String(raw) => parse_price(raw),
        other => Err(ValidationError::InvalidPrice(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> ProductPayload {
        serde_json::from_value(value).expect("payload")
    }

    #[test]
    fn accepts_numeric_strings_like_form_posts() {
        let draft = payload(json!({ "nome": "Widget", "quantidade": "5" }))
            .into_draft()
            .expect("draft");
        assert_eq!(draft.amount, Amount::Quantity { quantidade: 5 });
    }

    #[test]
    fn quantity_wins_over_price_when_both_present() {
        let draft = payload(json!({ "nome": "Widget", "quantidade": 2, "preco": 9.5 }))
            .into_draft()
            .expect("draft");
        assert_eq!(draft.amount, Amount::Quantity { quantidade: 2 });
    }

    #[test]
    fn rejects_missing_amount_and_negative_numbers() {
        assert_eq!(
            payload(json!({ "nome": "Widget" })).into_draft().unwrap_err(),
            ValidationError::MissingAmount
        );
        assert_eq!(
            payload(json!({ "nome": "Widget", "quantidade": -3 }))
                .into_draft()
                .unwrap_err(),
            ValidationError::NegativeQuantity
        );
        assert_eq!(
            payload(json!({ "nome": "Widget", "quantidade": true }))
                .into_draft()
                .unwrap_err(),
            ValidationError::InvalidQuantity("true".into())
        );
    }

    #[test]
    fn error_body_reads_legacy_field_name() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"erro":"Quantidade inválida"}"#).expect("body");
        assert_eq!(body.error, "Quantidade inválida");
        assert!(body.code.is_none());
    }
}
