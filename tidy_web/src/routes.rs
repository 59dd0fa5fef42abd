use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tidy::{
    domain::{
        core::{
            admit, enumerate_slots, has_conflict, is_duplicate_booking, Booking, BookingRequest,
            BookingRules, ConflictPolicy, ProposedSlot, ResourceId, Service, ServiceKey, Slot,
            Surface, TimeOfDay,
        },
        Id,
    },
    infrastructure::{
        core::{normalize_roster, RawBooking},
        parse_display_date, RawId,
    },
};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    rules: Arc<BookingRules>,
}

impl AppState {
    pub fn new(rules: BookingRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    fn roster(&self, bookings: Vec<RawBooking>) -> Vec<Booking> {
        normalize_roster(bookings, self.rules.duration_mode)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/slots", post(list_slots))
        .route("/conflicts", post(check_conflict))
        .route("/duplicates", post(check_duplicate))
        .route("/admissions", post(create_admission))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ServiceBody {
    pub key: RawId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration: String,
}

impl ServiceBody {
    fn into_service(self, rules: &BookingRules) -> ApiResult<Service> {
        let key = required::<ServiceKey>(Some(self.key), "service.key")?;
        Ok(Service::new(key, self.title, self.duration, rules.duration_mode))
    }
}

#[derive(Debug, Deserialize)]
pub struct ProposedBody {
    #[serde(default)]
    pub resource_id: Option<RawId>,
    #[serde(default)]
    pub customer_id: Option<RawId>,
    pub service_key: RawId,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub exclude_booking_id: Option<RawId>,
}

impl ProposedBody {
    fn into_slot(self, rules: &BookingRules) -> ApiResult<ProposedSlot> {
        Ok(ProposedSlot {
            resource_id: self.resource_id.and_then(RawId::into_id),
            customer_id: self.customer_id.and_then(RawId::into_id),
            service_key: required(Some(self.service_key), "service_key")?,
            date: date(&self.date)?,
            start: TimeOfDay::lenient(&self.time),
            duration_minutes: rules.duration_mode.parse(&self.duration),
            exclude_booking_id: self.exclude_booking_id.and_then(RawId::into_id),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub booking_id: Option<RawId>,
    #[serde(default)]
    pub customer_id: Option<RawId>,
    #[serde(default)]
    pub resource_id: Option<RawId>,
    pub service: ServiceBody,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, alias = "phone_number")]
    pub phone: String,
}

impl RequestBody {
    fn into_request(self, rules: &BookingRules) -> ApiResult<BookingRequest> {
        let date = self
            .date
            .filter(|text| !text.trim().is_empty())
            .map(|text| date(&text))
            .transpose()?;
        Ok(BookingRequest {
            booking_id: self.booking_id.and_then(RawId::into_id),
            customer_id: self.customer_id.and_then(RawId::into_id),
            resource_id: self.resource_id.and_then(RawId::into_id),
            service: self.service.into_service(rules)?,
            date,
            time: self.time,
            address: self.address,
            phone: self.phone,
        })
    }
}

fn required<I: Id>(id: Option<RawId>, field: &str) -> ApiResult<I> {
    id.and_then(RawId::into_id)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {}", field)))
}

fn date(text: &str) -> ApiResult<NaiveDate> {
    parse_display_date(text).ok_or_else(|| ApiError::BadRequest(format!("unreadable date: {}", text)))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct SlotsRequest {
    pub date: String,
    pub service: ServiceBody,
    pub resource_id: Option<RawId>,
    #[serde(default)]
    pub bookings: Vec<RawBooking>,
}

async fn list_slots(
    State(state): State<AppState>,
    Json(body): Json<SlotsRequest>,
) -> ApiResult<Json<Vec<Slot>>> {
    let date = date(&body.date)?;
    let resource_id = required::<ResourceId>(body.resource_id, "resource_id")?;
    let service = body.service.into_service(&state.rules)?;
    let roster = state.roster(body.bookings);
    debug!(%date, %resource_id, bookings = roster.len(), "空き枠を計算します");
    Ok(Json(enumerate_slots(
        date,
        &service,
        &resource_id,
        &roster,
        state.rules.window,
    )))
}

#[derive(Debug, Deserialize)]
pub struct ConflictRequest {
    pub proposed: ProposedBody,
    #[serde(default)]
    pub policy: ConflictPolicy,
    #[serde(default)]
    pub bookings: Vec<RawBooking>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ConflictResponse {
    pub conflict: bool,
}

async fn check_conflict(
    State(state): State<AppState>,
    Json(body): Json<ConflictRequest>,
) -> ApiResult<Json<ConflictResponse>> {
    let proposed = body.proposed.into_slot(&state.rules)?;
    let roster = state.roster(body.bookings);
    Ok(Json(ConflictResponse {
        conflict: has_conflict(&proposed, &roster, body.policy),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
    pub proposed: ProposedBody,
    #[serde(default)]
    pub bookings: Vec<RawBooking>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateResponse {
    pub duplicate: bool,
}

async fn check_duplicate(
    State(state): State<AppState>,
    Json(body): Json<DuplicateRequest>,
) -> ApiResult<Json<DuplicateResponse>> {
    let proposed = body.proposed.into_slot(&state.rules)?;
    let roster = state.roster(body.bookings);
    Ok(Json(DuplicateResponse {
        duplicate: is_duplicate_booking(&proposed, &roster),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdmissionRequest {
    pub surface: Surface,
    pub request: RequestBody,
    #[serde(default)]
    pub bookings: Vec<RawBooking>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct AdmissionResponse {
    pub slot: ProposedSlot,
}

async fn create_admission(
    State(state): State<AppState>,
    Json(body): Json<AdmissionRequest>,
) -> ApiResult<Json<AdmissionResponse>> {
    let request = body.request.into_request(&state.rules)?;
    let roster = state.roster(body.bookings);
    let slot = admit(body.surface, &request, &roster, &state.rules)?;
    Ok(Json(AdmissionResponse { slot }))
}

#[cfg(test)]
mod tests {
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use tidy::domain::core::Rejection;

    use super::*;

    fn state() -> AppState {
        AppState::new(BookingRules::default())
    }

    fn body<T: DeserializeOwned>(value: Value) -> Json<T> {
        Json(serde_json::from_value(value).unwrap())
    }

    fn bookings() -> Value {
        json!([
            {"id": 1, "cleaner_id": 3, "user_id": 8, "service_id": 1, "date": "Jun 10, 2024", "time": "10:00 AM", "status": "confirmed"},
            {"id": 2, "cleaner_id": 4, "user_id": 9, "service_id": 2, "date": "2024-06-10", "time": "13:00", "raw_status": "pending"},
            {"id": 3, "cleaner_id": 3, "service_id": 1, "time": "15:00"}
        ])
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn test_list_slots() {
        let Json(slots) = list_slots(
            State(state()),
            body(json!({
                "date": "2024-06-10",
                "service": {"key": 1, "title": "Standard Cleaning", "duration": "1h"},
                "resource_id": 3,
                "bookings": bookings(),
            })),
        )
        .await
        .unwrap();
        assert_eq!(slots.len(), 10);
        let busy = slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(busy, vec!["10:00 AM"]);
    }

    #[tokio::test]
    async fn test_list_slots_requires_resource() {
        let result = list_slots(
            State(state()),
            body(json!({
                "date": "2024-06-10",
                "service": {"key": 1, "duration": "1h"},
                "resource_id": "",
            })),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_check_conflict_by_policy() {
        let request = |policy: &str| {
            body(json!({
                "proposed": {
                    "resource_id": 4, "service_key": 1, "date": "2024-06-10",
                    "time": "1:30 PM", "duration": "1h",
                },
                "policy": policy,
                "bookings": bookings(),
            }))
        };
        let Json(response) = check_conflict(State(state()), request("resource-busy"))
            .await
            .unwrap();
        assert_eq!(response, ConflictResponse { conflict: false });
        let Json(response) = check_conflict(State(state()), request("allow-except-cancelled"))
            .await
            .unwrap();
        assert_eq!(response, ConflictResponse { conflict: true });
    }

    #[tokio::test]
    async fn test_check_duplicate() {
        let request = |exclude: Value| {
            body(json!({
                "proposed": {
                    "customer_id": "8", "service_key": 1, "date": "June 10, 2024",
                    "time": "10:00", "exclude_booking_id": exclude,
                },
                "bookings": bookings(),
            }))
        };
        let Json(response) = check_duplicate(State(state()), request(Value::Null))
            .await
            .unwrap();
        assert_eq!(response, DuplicateResponse { duplicate: true });
        let Json(response) = check_duplicate(State(state()), request(json!(1)))
            .await
            .unwrap();
        assert_eq!(response, DuplicateResponse { duplicate: false });
    }

    #[tokio::test]
    async fn test_create_admission() {
        let request = |surface: &str, time: &str| {
            body(json!({
                "surface": surface,
                "request": {
                    "customer_id": 7, "resource_id": 3,
                    "service": {"key": 1, "title": "Standard Cleaning", "duration": "1h"},
                    "date": "2024-06-10", "time": time,
                    "address": "12 Mabini St.", "phone_number": "09171234567",
                },
                "bookings": bookings(),
            }))
        };

        let Json(response) = create_admission(State(state()), request("admin", "8:00 AM"))
            .await
            .unwrap();
        assert_eq!(response.slot.start, TimeOfDay::from_hm(8, 0));
        assert_eq!(response.slot.resource_id, Some(ResourceId::new(3)));

        let result = create_admission(State(state()), request("admin", "10:30 AM")).await;
        assert!(matches!(
            result,
            Err(ApiError::Rejected(Rejection::CleanerUnavailable))
        ));

        let result = create_admission(State(state()), request("customer", "10:30 AM")).await;
        assert!(matches!(
            result,
            Err(ApiError::Rejected(Rejection::ServiceOverlap))
        ));

        let result = create_admission(State(state()), request("customer", "5:30 PM")).await;
        assert!(matches!(
            result,
            Err(ApiError::Rejected(Rejection::OutsideOperatingHours { .. }))
        ));
    }
}
