use std::sync::Arc;

use anyhow::Context;
use storage::Storage;
use tracing::info;

pub mod config;
pub mod controller;
pub mod form;
pub mod http;
pub mod local;
pub mod notify;
pub mod repository;

pub use config::{load_client_settings, Backend, ClientSettings};
pub use controller::{
    AlwaysConfirm, ConfirmationPrompt, ControllerError, DeleteOutcome, DisplayState, EditMode,
    ProductListController, Submission,
};
pub use form::ProductForm;
pub use http::HttpProductRepository;
pub use local::{KeyValueStore, LocalProductRepository, MemoryKeyValueStore};
pub use notify::{Notification, NotificationEvent, NotificationKind, Notifier};
pub use repository::{ProductRepository, RepositoryError};

pub async fn build_repository(
    settings: &ClientSettings,
) -> anyhow::Result<Arc<dyn ProductRepository>> {
    match settings.backend {
        Backend::Http => {
            let repository =
                HttpProductRepository::new(&settings.api_url, settings.request_timeout())?;
            info!(api_url = repository.base_url(), "using http product backend");
            Ok(Arc::new(repository))
        }
        Backend::Local => {
            let storage = Storage::new(&settings.local_database_url)
                .await
                .with_context(|| {
                    format!(
                        "failed to open local store '{}'",
                        settings.local_database_url
                    )
                })?;
            info!(
                database_url = %settings.local_database_url,
                "using local product backend"
            );
            Ok(Arc::new(LocalProductRepository::new(storage)))
        }
    }
}

pub async fn build_controller(
    settings: &ClientSettings,
    confirm: Arc<dyn ConfirmationPrompt>,
) -> anyhow::Result<ProductListController> {
    let repository = build_repository(settings).await?;
    Ok(ProductListController::new(
        repository,
        confirm,
        Notifier::new(settings.flash_ttl()),
        settings.amount_kind,
    ))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
