use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::{
    create_product, delete_product, get_product, list_products, product_route, products_route,
    update_product, ApiContext,
};
use shared::{
    domain::{Product, ProductId},
    error::{ApiError, ErrorCode},
    protocol::{ErrorBody, MessageBody},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod body;
mod config;

use app_state::AppState;
use body::ProductBody;
use config::{load_settings, prepare_database_url};

pub(crate) type HttpError = (StatusCode, Json<ErrorBody>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
        max_body_bytes: settings.max_body_bytes,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route("/healthz", get(healthz))
        .route(products_route(), get(http_list_products).post(http_create_product))
        .route(
            product_route(),
            get(http_get_product)
                .put(http_update_product)
                .delete(http_delete_product),
        )
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| http_error(ApiError::internal(e.to_string())))?;
    Ok("ok")
}

async fn http_list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, HttpError> {
    list_products(&state.api).await.map(Json).map_err(http_error)
}

async fn http_get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, HttpError> {
    get_product(&state.api, ProductId(id))
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_create_product(
    State(state): State<Arc<AppState>>,
    ProductBody(payload): ProductBody,
) -> Result<(StatusCode, Json<Product>), HttpError> {
    let product = create_product(&state.api, payload)
        .await
        .map_err(http_error)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn http_update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ProductBody(payload): ProductBody,
) -> Result<Json<Product>, HttpError> {
    update_product(&state.api, ProductId(id), payload)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageBody>, HttpError> {
    delete_product(&state.api, ProductId(id))
        .await
        .map_err(http_error)?;
    Ok(Json(MessageBody {
        mensagem: format!("product {id} removed"),
    }))
}

fn http_error(error: ApiError) -> HttpError {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody::from(error)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
