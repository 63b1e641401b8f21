//! OpenAPI documentation for the image endpoint.
//!
//! The generated document is served as JSON at `/api/openapi.json`.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use super::AppContext;

/// OpenAPI documentation for Vitae.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vitae Image API",
        version = "0.1.0",
        description = "Credential image upload and delivery",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::routes_images::upload_image,
        super::routes_images::fetch_image,
    ),
    components(
        schemas(
            super::routes_images::UploadResponse,
            super::error::ErrorBody,
        )
    ),
    tags(
        (name = "titulos", description = "Credential image endpoints"),
    )
)]
pub struct ApiDoc;

/// Create OpenAPI documentation routes.
pub fn openapi_routes() -> Router<AppContext> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
