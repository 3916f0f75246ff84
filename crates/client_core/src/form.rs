use shared::{
    domain::{Amount, AmountKind, Product, ProductDraft},
    error::ValidationError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub nome: String,
    pub amount: String,
    pub descricao: String,
    pub imagem: String,
}

impl ProductForm {
    pub fn new(nome: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn with_descricao(mut self, descricao: impl Into<String>) -> Self {
        self.descricao = descricao.into();
        self
    }

    pub fn with_imagem(mut self, imagem: impl Into<String>) -> Self {
        self.imagem = imagem.into();
        self
    }

    pub fn from_product(product: &Product) -> Self {
        // full precision; the display format rounds prices
        let amount = match product.amount {
            Amount::Quantity { quantidade } => quantidade.to_string(),
            Amount::Price { preco } => preco.to_string(),
        };
        Self {
            nome: product.nome.clone(),
            amount,
            descricao: product.descricao.clone().unwrap_or_default(),
            imagem: product.imagem.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self, kind: AmountKind) -> Result<ProductDraft, ValidationError> {
        if self.nome.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        let amount = kind.parse(&self.amount)?;
        ProductDraft::new(
            &self.nome,
            amount,
            Some(self.descricao.as_str()),
            Some(self.imagem.as_str()),
        )
    }
}
