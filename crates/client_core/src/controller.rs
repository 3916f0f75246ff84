use std::sync::Arc;

use shared::{
    domain::{AmountKind, Product, ProductDraft, ProductId},
    error::ValidationError,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    form::ProductForm,
    notify::Notifier,
    repository::{ProductRepository, RepositoryError},
};

pub const VALIDATION_MESSAGE: &str = "Please fill in all fields correctly.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Idle,
    Editing(ProductId),
}

impl EditMode {
    pub fn editing_id(self) -> Option<ProductId> {
        match self {
            EditMode::Idle => None,
            EditMode::Editing(id) => Some(id),
        }
    }

    pub fn form_title(self) -> &'static str {
        match self {
            EditMode::Idle => "Add New Product",
            EditMode::Editing(_) => "Editing Product",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            EditMode::Idle => "Add Product",
            EditMode::Editing(_) => "Update Product",
        }
    }

    pub fn shows_cancel(self) -> bool {
        matches!(self, EditMode::Editing(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    Loading,
    Empty,
    Error,
    Populated(Vec<Product>),
}

impl DisplayState {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayState::Loading => "loading",
            DisplayState::Empty => "empty",
            DisplayState::Error => "error",
            DisplayState::Populated(_) => "populated",
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to load products: {0}")]
    Load(String),
    #[error("{0}")]
    Write(String),
    #[error("product {0} not found")]
    NotFound(ProductId),
}

impl ControllerError {
    fn from_write(err: RepositoryError, fallback: &str) -> Self {
        match err {
            RepositoryError::NotFound(id) => ControllerError::NotFound(id),
            RepositoryError::Rejected(message) => ControllerError::Write(message),
            other => ControllerError::Write(format!("{fallback}: {other}")),
        }
    }
}

pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

pub struct AlwaysConfirm;

impl ConfirmationPrompt for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug)]
pub struct Submission {
    pub mode: EditMode,
    pub form: ProductForm,
    pub result: Result<Product, ControllerError>,
}

pub struct ProductListController {
    repository: Arc<dyn ProductRepository>,
    confirm: Arc<dyn ConfirmationPrompt>,
    notifier: Notifier,
    amount_kind: AmountKind,
    display: watch::Sender<DisplayState>,
}

impl ProductListController {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        confirm: Arc<dyn ConfirmationPrompt>,
        notifier: Notifier,
        amount_kind: AmountKind,
    ) -> Self {
        let (display, _) = watch::channel(DisplayState::Loading);
        Self {
            repository,
            confirm,
            notifier,
            amount_kind,
            display,
        }
    }

    pub fn display(&self) -> DisplayState {
        self.display.borrow().clone()
    }

    pub fn subscribe_display(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn amount_kind(&self) -> AmountKind {
        self.amount_kind
    }

    /// Reloads the list: `Loading` first, then `Empty`, `Populated` or `Error`.
    pub async fn refresh(&self) -> Result<Vec<Product>, ControllerError> {
        self.display.send_replace(DisplayState::Loading);

        match self.repository.list().await {
            Ok(products) if products.is_empty() => {
                self.display.send_replace(DisplayState::Empty);
                Ok(products)
            }
            Ok(products) => {
                self.display
                    .send_replace(DisplayState::Populated(products.clone()));
                Ok(products)
            }
            Err(err) => {
                error!(error = %err, "failed to load products");
                self.display.send_replace(DisplayState::Error);
                Err(ControllerError::Load(err.to_string()))
            }
        }
    }

    pub async fn create(&self, form: &ProductForm) -> Result<Product, ControllerError> {
        let draft = self.validate(form)?;
        let product = match self.repository.create(&draft).await {
            Ok(product) => product,
            Err(err) => return Err(self.write_failed(err, "failed to add product")),
        };

        info!(product_id = product.id.0, "product added");
        self.after_write("Product added successfully!").await;
        Ok(product)
    }

    pub async fn read(&self, id: ProductId) -> Result<Product, ControllerError> {
        self.repository.read(id).await.map_err(|err| match err {
            RepositoryError::NotFound(id) => ControllerError::NotFound(id),
            other => ControllerError::Load(other.to_string()),
        })
    }

    pub async fn update(
        &self,
        id: ProductId,
        form: &ProductForm,
    ) -> Result<Product, ControllerError> {
        let draft = self.validate(form)?;
        let product = match self.repository.update(id, &draft).await {
            Ok(product) => product,
            Err(err) => return Err(self.write_failed(err, "failed to update product")),
        };

        info!(product_id = id.0, "product updated");
        self.after_write("Product updated successfully!").await;
        Ok(product)
    }

    pub async fn delete(&self, id: ProductId) -> Result<DeleteOutcome, ControllerError> {
        if !self.confirm.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(err) = self.repository.delete(id).await {
            return Err(self.write_failed(err, "failed to delete product"));
        }

        info!(product_id = id.0, "product deleted");
        self.after_write("Product deleted successfully!").await;
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn start_edit(&self, id: ProductId) -> Result<(EditMode, ProductForm), ControllerError> {
        match self.read(id).await {
            Ok(product) => Ok((EditMode::Editing(id), ProductForm::from_product(&product))),
            Err(err) => {
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    pub fn cancel_edit(&self) -> (EditMode, ProductForm) {
        (EditMode::Idle, ProductForm::default())
    }

    pub async fn submit(&self, mode: EditMode, form: ProductForm) -> Submission {
        let result = match mode {
            EditMode::Idle => self.create(&form).await,
            EditMode::Editing(id) => self.update(id, &form).await,
        };

        match result {
            Ok(product) => Submission {
                mode: EditMode::Idle,
                form: ProductForm::default(),
                result: Ok(product),
            },
            Err(err) => Submission {
                mode,
                form,
                result: Err(err),
            },
        }
    }

    fn validate(&self, form: &ProductForm) -> Result<ProductDraft, ControllerError> {
        form.validate(self.amount_kind).map_err(|err| {
            warn!(error = %err, "product form rejected");
            self.notifier.error(VALIDATION_MESSAGE);
            ControllerError::Validation(err)
        })
    }

    fn write_failed(&self, err: RepositoryError, fallback: &str) -> ControllerError {
        warn!(error = %err, "product write failed");
        let err = ControllerError::from_write(err, fallback);
        self.notifier.error(err.to_string());
        err
    }

    async fn after_write(&self, message: &str) {
        // a failed reload already shows the error panel
        let _ = self.refresh().await;
        self.notifier.success(message);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
