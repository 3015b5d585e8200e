use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers::health::HealthResponse;
use crate::handlers::receiving::{
    EditLockRequest, ReceiveLineRequest, ReceiveShipmentRequest, ReceiveShipmentResponse,
    SuccessResponse, UnlockShipmentRequest,
};
use crate::models::submission::ReceiveStats;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "goodsin-api",
        description = "Goods-in receiving, reconciliation and claims"
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::receiving::get_shipment,
        crate::handlers::receiving::receive_shipment,
        crate::handlers::receiving::unlock_shipment,
        crate::handlers::receiving::acquire_lock,
        crate::handlers::receiving::extend_lock,
        crate::handlers::receiving::release_lock,
    ),
    components(schemas(
        ErrorResponse,
        HealthResponse,
        ReceiveShipmentRequest,
        ReceiveLineRequest,
        ReceiveShipmentResponse,
        ReceiveStats,
        UnlockShipmentRequest,
        EditLockRequest,
        SuccessResponse,
    )),
    tags(
        (name = "receiving", description = "Receive submissions and unlock"),
        (name = "locks", description = "Advisory edit locks"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
