use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bson::oid::ObjectId;
use serde_json::{json, Map, Value};
use tracing::{error, warn};

use crate::model::Lead;
use crate::service::lead_service::{LeadService, LeadServiceImpl, SubmitOutcome};
use crate::util::error::{HandlerError, HandlerErrorKind};

/// Rejects bodies that are not JSON or do not fit the expected shape, as a 400.
fn body_error(rejection: JsonRejection) -> HandlerError {
    warn!("Rejected request body: {}", rejection.body_text());
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            HandlerError::bad_request("Expected a JSON body with Content-Type: application/json")
        }
        other => HandlerError::new(HandlerErrorKind::InvalidValue, other.body_text()),
    }
}

fn parse_id(raw: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| {
        warn!("Invalid id in path: {}", raw);
        HandlerError::bad_request(format!("Invalid id: {}", raw))
    })
}

/// JSON view of a stored record, with the store's `_id` exposed as a plain `id` string.
pub fn record_view<E: Lead>(record: &E) -> Result<Value, HandlerError> {
    let mut value = serde_json::to_value(record).map_err(|e| {
        error!("Failed to serialize {}: {}", E::LABEL, e);
        HandlerError::new(HandlerErrorKind::Internal, "Internal server error")
    })?;
    if let Value::Object(fields) = &mut value {
        fields.remove("_id");
        if let Some(id) = record.id() {
            fields.insert("id".to_string(), Value::String(id.to_hex()));
        }
    }
    Ok(value)
}

pub async fn create_lead_handler<E: Lead>(
    State(service): State<Arc<LeadServiceImpl<E>>>,
    payload: Result<Json<E::Submission>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(raw) = payload.map_err(body_error)?;
    let submitted = service.submit(raw).await?;
    let id = submitted.record.id().map(|id| id.to_hex());
    let message = match submitted.outcome {
        SubmitOutcome::Created => format!("Your {} has been received", E::LABEL),
        SubmitOutcome::Reactivated => format!("Your {} has been reactivated", E::LABEL),
    };
    Ok((StatusCode::CREATED, Json(json!({ "message": message, "id": id }))))
}

pub async fn list_leads_handler<E: Lead>(
    State(service): State<Arc<LeadServiceImpl<E>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = service.list(&params).await?;
    let records = page
        .records
        .iter()
        .map(record_view)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = Map::new();
    body.insert(E::LIST_KEY.to_string(), Value::Array(records));
    body.insert("total".to_string(), json!(page.total));
    body.insert("page".to_string(), json!(page.page));
    body.insert("limit".to_string(), json!(page.limit));
    Ok(Json(Value::Object(body)))
}

pub async fn get_lead_handler<E: Lead>(
    State(service): State<Arc<LeadServiceImpl<E>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let record = service.get(id).await?;
    Ok(Json(record_view(&record)?))
}

pub async fn update_lead_handler<E: Lead>(
    State(service): State<Arc<LeadServiceImpl<E>>>,
    Path(id): Path<String>,
    payload: Result<Json<E::Patch>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(body_error)?;
    let record = service.update(id, patch).await?;
    Ok(Json(record_view(&record)?))
}

pub async fn delete_lead_handler<E: Lead>(
    State(service): State<Arc<LeadServiceImpl<E>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    service.delete(id).await?;
    Ok(Json(json!({
        "message": format!("{} deleted", E::LABEL),
        "id": id.to_hex(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::newsletter::{NewsletterSubscriber, SubscriberStatus};

    #[test]
    fn record_view_exposes_hex_id() {
        let id = ObjectId::new();
        let record = NewsletterSubscriber {
            id: Some(id),
            email: "a@x.com".to_string(),
            status: SubscriberStatus::Active,
            created_at: "2026-10-18T09:00:00.000Z".to_string(),
            updated_at: "2026-10-18T09:00:00.000Z".to_string(),
        };
        let view = record_view(&record).unwrap();
        assert_eq!(view["id"], json!(id.to_hex()));
        assert!(view.get("_id").is_none());
        assert_eq!(view["status"], json!("active"));
        assert_eq!(view["createdAt"], json!("2026-10-18T09:00:00.000Z"));
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        let err = parse_id("not-an-id").unwrap_err();
        assert_eq!(err.kind, HandlerErrorKind::BadRequest);
    }
}
