use utoipa::OpenApi;
use crate::models::*;

/// Get current text content
#[utoipa::path(
    get,
    path = "/text",
    responses(
        (status = 200, description = "Current document", body = TextResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_text_doc() {}

/// Replace the text content and broadcast it
#[utoipa::path(
    post,
    path = "/text",
    request_body = TextUpdateRequest,
    responses(
        (status = 200, description = "Text replaced and broadcast", body = TextUpdateResponse),
        (status = 500, description = "Text could not be persisted", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_text_doc() {}

/// Server status
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Connected clients and document statistics", body = StatusResponse)
    )
)]
#[allow(dead_code)]
pub async fn status_doc() {}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// API information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = RootResponse)
    )
)]
#[allow(dead_code)]
pub async fn root_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_text_doc,
        update_text_doc,
        status_doc,
        health_check_doc,
        root_doc,
    ),
    components(
        schemas(TextResponse, TextUpdateRequest, TextUpdateResponse, StatusResponse, HealthResponse, RootResponse, ErrorResponse)
    ),
    tags(
        (name = "api", description = "Collaborative text API")
    )
)]
pub struct ApiDoc;
