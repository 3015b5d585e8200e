use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::common::{map_service_error, success_response, validate_input};
use crate::{
    entities::{shipment, shipment_line},
    errors::ApiError,
    handlers::AppState,
    models::{
        submission::{parse_readonly_flag, QuantityField, ReceiveStats, SubmittedLine},
        DiscrepancyType,
    },
    services::receiving::ReceiveShipmentCommand,
};

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveShipmentRequest {
    #[validate(range(min = 1))]
    pub staff_id: i64,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Cross-checked against the shipment header when present.
    pub source_outlet: Option<String>,
    pub destination_outlet: Option<String>,
    /// Confirms a submission with zero counted lines on purpose.
    #[serde(default)]
    pub allow_empty: bool,
    pub lines: Vec<ReceiveLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReceiveLineRequest {
    pub product_id: String,
    /// Count for this line. Number or numeric string; blank/absent means
    /// "not counted yet" and keeps the line pending.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub received: Option<serde_json::Value>,
    #[serde(default)]
    pub slip_qty: Option<i32>,
    #[serde(default)]
    pub damaged_qty: Option<i32>,
    #[serde(default)]
    pub discrepancy_type: Option<String>,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub substitution_product_id: Option<String>,
    /// Legacy flag: accepts bool, 0/1 and "true"/"false"/"0"/"1".
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub readonly: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiveShipmentResponse {
    pub success: bool,
    pub updated: u32,
    pub pending: u32,
    pub complete: bool,
    pub confidence: u8,
    pub stats: ReceiveStats,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UnlockShipmentRequest {
    #[validate(range(min = 1))]
    pub staff_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditLockRequest {
    #[validate(range(min = 1))]
    pub staff_id: i64,
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ShipmentViewResponse {
    pub shipment: shipment::Model,
    pub lines: Vec<shipment_line::Model>,
}

/// Parses the loose client line encodings into typed submission lines.
/// Rejecting here, before the service runs, keeps bad input from ever
/// opening a transaction.
fn parse_lines(lines: &[ReceiveLineRequest]) -> Result<Vec<SubmittedLine>, ApiError> {
    let mut parsed = Vec::with_capacity(lines.len());
    for line in lines {
        if line.product_id.trim().is_empty() {
            return Err(ApiError::Validation("Line is missing a product id".into()));
        }
        let received = QuantityField::parse(line.received.as_ref()).map_err(|e| {
            ApiError::Validation(format!("Product {}: {}", line.product_id, e))
        })?;
        let readonly = parse_readonly_flag(line.readonly.as_ref()).map_err(|e| {
            ApiError::Validation(format!("Product {}: {}", line.product_id, e))
        })?;
        let damaged_qty = line.damaged_qty.unwrap_or(0);
        if damaged_qty < 0 {
            return Err(ApiError::Validation(format!(
                "Product {}: damaged quantity cannot be negative",
                line.product_id
            )));
        }
        if let Some(slip) = line.slip_qty {
            if slip < 0 {
                return Err(ApiError::Validation(format!(
                    "Product {}: slip quantity cannot be negative",
                    line.product_id
                )));
            }
        }
        let discrepancy = match line.discrepancy_type.as_deref() {
            None => DiscrepancyType::Ok,
            Some(raw) => DiscrepancyType::parse(raw).ok_or_else(|| {
                ApiError::Validation(format!(
                    "Product {}: unknown discrepancy type {:?}",
                    line.product_id, raw
                ))
            })?,
        };

        parsed.push(SubmittedLine {
            product_id: line.product_id.clone(),
            received,
            slip_qty: line.slip_qty,
            damaged_qty,
            discrepancy,
            unit_cost: line.unit_cost,
            note: line.note.clone(),
            substitution_product_id: line.substitution_product_id.clone(),
            readonly,
        });
    }
    Ok(parsed)
}

// Handler functions

/// Submit counted quantities for a shipment
#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/receive",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = ReceiveShipmentRequest,
    responses(
        (status = 200, description = "Submission reconciled", body = ReceiveShipmentResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "Shipment already complete", body = crate::errors::ErrorResponse),
        (status = 422, description = "Nothing to reconcile", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn receive_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReceiveShipmentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let lines = parse_lines(&payload.lines)?;

    let outcome = state
        .services
        .receiving
        .receive(ReceiveShipmentCommand {
            shipment_id: id,
            staff_id: payload.staff_id,
            lines,
            notes: payload.notes,
            expected_source: payload.source_outlet,
            expected_destination: payload.destination_outlet,
            allow_empty: payload.allow_empty,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ReceiveShipmentResponse {
        success: true,
        updated: outcome.updated,
        pending: outcome.pending,
        complete: outcome.complete,
        confidence: outcome.confidence,
        stats: outcome.stats,
    }))
}

/// Reopen a completed shipment for correction
#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/unlock",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = UnlockShipmentRequest,
    responses(
        (status = 200, description = "Shipment reopened", body = SuccessResponse),
        (status = 400, description = "Shipment is not complete", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn unlock_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UnlockShipmentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .receiving
        .unlock(id, payload.staff_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(SuccessResponse { success: true }))
}

/// Fetch a shipment header and its active lines
#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Shipment with lines"),
        (status = 404, description = "Shipment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (header, lines) = state
        .services
        .receiving
        .get_shipment(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ShipmentViewResponse {
        shipment: header,
        lines,
    }))
}

/// Acquire the advisory edit lock for a counting session
#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/lock",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = EditLockRequest,
    responses(
        (status = 200, description = "Lock acquired or refreshed", body = SuccessResponse),
        (status = 409, description = "Locked by another editor", body = crate::errors::ErrorResponse)
    ),
    tag = "locks"
)]
pub async fn acquire_lock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EditLockRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .edit_locks
        .acquire(id, payload.staff_id, &payload.session_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(SuccessResponse { success: true }))
}

/// Extend the advisory edit lock
#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/lock/extend",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = EditLockRequest,
    responses((status = 200, description = "Whether a live lock was extended", body = SuccessResponse)),
    tag = "locks"
)]
pub async fn extend_lock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EditLockRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let extended = state
        .services
        .edit_locks
        .extend(id, payload.staff_id, &payload.session_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(SuccessResponse { success: extended }))
}

/// Release the advisory edit lock
#[utoipa::path(
    delete,
    path = "/api/v1/shipments/{id}/lock",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = EditLockRequest,
    responses((status = 200, description = "Lock released", body = SuccessResponse)),
    tag = "locks"
)]
pub async fn release_lock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EditLockRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .edit_locks
        .release(id, payload.staff_id, &payload.session_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(SuccessResponse { success: true }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shipments/:id", get(get_shipment))
        .route("/shipments/:id/receive", post(receive_shipment))
        .route("/shipments/:id/unlock", post(unlock_shipment))
        .route(
            "/shipments/:id/lock",
            post(acquire_lock).delete(release_lock),
        )
        .route("/shipments/:id/lock/extend", post(extend_lock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(product: &str, received: serde_json::Value) -> ReceiveLineRequest {
        ReceiveLineRequest {
            product_id: product.to_string(),
            received: Some(received),
            slip_qty: None,
            damaged_qty: None,
            discrepancy_type: None,
            unit_cost: None,
            note: None,
            substitution_product_id: None,
            readonly: None,
        }
    }

    #[test]
    fn parse_lines_keeps_blank_distinct_from_zero() {
        let parsed = parse_lines(&[line("a", json!("")), line("b", json!(0))]).unwrap();
        assert!(parsed[0].received.is_blank());
        assert_eq!(parsed[1].received.value(), Some(0));
    }

    #[test]
    fn parse_lines_rejects_negative_damaged() {
        let mut bad = line("a", json!(5));
        bad.damaged_qty = Some(-1);
        let err = parse_lines(&[bad]).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn parse_lines_rejects_unknown_discrepancy() {
        let mut bad = line("a", json!(5));
        bad.discrepancy_type = Some("SHRUG".into());
        assert!(parse_lines(&[bad]).is_err());
    }

    #[test]
    fn parse_lines_defaults_discrepancy_to_ok() {
        let parsed = parse_lines(&[line("a", json!(5))]).unwrap();
        assert_eq!(parsed[0].discrepancy, DiscrepancyType::Ok);
        assert!(!parsed[0].readonly);
    }

    #[test]
    fn parse_lines_accepts_legacy_readonly_strings() {
        let mut ro = line("a", json!(5));
        ro.readonly = Some(json!("false"));
        let parsed = parse_lines(&[ro]).unwrap();
        assert!(!parsed[0].readonly);

        let mut ro = line("b", json!(5));
        ro.readonly = Some(json!("1"));
        let parsed = parse_lines(&[ro]).unwrap();
        assert!(parsed[0].readonly);
    }

    #[test]
    fn parse_lines_requires_product_id() {
        assert!(parse_lines(&[line("  ", json!(1))]).is_err());
    }
}
