//! Registration and check-in request handlers

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::handlers::{ApiResponse, HandlerResult};
use crate::models::{CheckInClassification, Registration};
use crate::services::{Actor, ServiceFactory};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationRequest {
    pub event_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub qr_code: String,
}

/// Body of `POST /events/{id}/check-in`
#[derive(Debug, Clone, Serialize)]
pub struct CheckInBody {
    pub registration: Registration,
    pub classification: CheckInClassification,
}

/// `POST /registrations`
pub async fn create_registration(
    services: &ServiceFactory,
    actor: &Actor,
    request: CreateRegistrationRequest,
) -> HandlerResult<Registration> {
    debug!(user_id = actor.user_id, event_id = request.event_id, "Handling registration");
    let registration = services.registrations.register(actor, request.event_id).await?;
    Ok(ApiResponse::created(registration))
}

/// `DELETE /registrations/{id}`
pub async fn cancel_registration(services: &ServiceFactory, actor: &Actor, registration_id: i64) -> HandlerResult<Registration> {
    debug!(user_id = actor.user_id, registration_id = registration_id, "Handling registration cancel");
    let registration = services.registrations.cancel(actor, registration_id).await?;
    Ok(ApiResponse::ok(registration))
}

/// `POST /events/{id}/check-in`
pub async fn check_in(services: &ServiceFactory, actor: &Actor, event_id: i64, request: CheckInRequest) -> HandlerResult<CheckInBody> {
    debug!(user_id = actor.user_id, event_id = event_id, "Handling check-in scan");
    let outcome = services.check_in.check_in_as(actor, event_id, &request.qr_code).await?;
    Ok(ApiResponse::ok(CheckInBody {
        registration: outcome.registration,
        classification: outcome.classification,
    }))
}
