mod api;
mod error;
mod state;
mod types;
mod upload;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;
pub use self::types::ErrorResponse;
pub use self::upload::TempUpload;

/// 默认上传限制：10M
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024 * 10;

#[derive(OpenApi)]
#[openapi(
    paths(api::ping_handler, api::search_image_handler, api::metrics_handler),
    components(schemas(types::ErrorResponse))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/ping", get(api::ping_handler))
        .route("/search/image", post(api::search_image_handler))
        .route("/metrics", get(api::metrics_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
