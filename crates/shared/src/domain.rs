use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProductId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    #[default]
    Quantity,
    Price,
}

impl AmountKind {
    pub fn label(self) -> &'static str {
        match self {
            AmountKind::Quantity => "Quantity",
            AmountKind::Price => "Price",
        }
    }

    pub fn parse(self, raw: &str) -> Result<Amount, ValidationError> {
        match self {
            AmountKind::Quantity => parse_quantity(raw).map(|quantidade| Amount::Quantity { quantidade }),
            AmountKind::Price => parse_price(raw).map(|preco| Amount::Price { preco }),
        }
    }
}

impl std::str::FromStr for AmountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quantity" | "quantidade" => Ok(AmountKind::Quantity),
            "price" | "preco" => Ok(AmountKind::Price),
            other => Err(format!("unknown amount kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Quantity { quantidade: u64 },
    Price { preco: f64 },
}

impl Amount {
    pub fn kind(&self) -> AmountKind {
        match self {
            Amount::Quantity { .. } => AmountKind::Quantity,
            Amount::Price { .. } => AmountKind::Price,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Amount::Quantity { quantidade } if i64::try_from(quantidade).is_err() => {
                Err(ValidationError::InvalidQuantity(quantidade.to_string()))
            }
            Amount::Quantity { .. } => Ok(()),
            Amount::Price { preco } if !preco.is_finite() => {
                Err(ValidationError::InvalidPrice(preco.to_string()))
            }
            Amount::Price { preco } if preco < 0.0 => Err(ValidationError::NegativePrice),
            Amount::Price { .. } => Ok(()),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Quantity { quantidade } => write!(f, "{quantidade}"),
            Amount::Price { preco } => write!(f, "{preco:.2}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub nome: String,
    #[serde(flatten)]
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagem: Option<String>,
}

impl Product {
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            nome: draft.nome,
            amount: draft.amount,
            descricao: draft.descricao,
            imagem: draft.imagem,
        }
    }

    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            nome: self.nome.clone(),
            amount: self.amount,
            descricao: self.descricao.clone(),
            imagem: self.imagem.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub nome: String,
    #[serde(flatten)]
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagem: Option<String>,
}

impl ProductDraft {
    pub fn new(
        nome: &str,
        amount: Amount,
        descricao: Option<&str>,
        imagem: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let draft = Self {
            nome: nome.trim().to_string(),
            amount,
            descricao: non_blank(descricao),
            imagem: non_blank(imagem),
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.nome.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        self.amount.validate()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn parse_quantity(raw: &str) -> Result<u64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingQuantity);
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidQuantity(raw.to_string()))?;
    u64::try_from(value).map_err(|_| ValidationError::NegativeQuantity)
}

pub fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingPrice);
    }
    let value: f64 = raw
        .replace(',', ".")
        .parse()
        .map_err(|_| ValidationError::InvalidPrice(raw.to_string()))?;
    if !value.is_finite() {
        return Err(ValidationError::InvalidPrice(raw.to_string()));
    }
    if value < 0.0 {
        return Err(ValidationError::NegativePrice);
    }
    Ok(value)
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
