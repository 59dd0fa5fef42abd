use chrono::NaiveDate;
use derive_more::{Display, Error};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    has_conflict, has_service_overlap, is_duplicate_booking, Booking, BookingId, BookingRules,
    ConflictPolicy, CustomerId, ProposedSlot, ResourceId, Service, TimeOfDay,
};

static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^09\d{9}$").expect("valid regex"));

/// 予約を登録する画面
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// 管理者が代理で登録・編集する
    Admin,
    /// お客様自身が予約する
    Customer,
}

/// 予約の登録・更新リクエスト
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    /// 更新時のみ
    pub booking_id: Option<BookingId>,
    pub customer_id: Option<CustomerId>,
    pub resource_id: Option<ResourceId>,
    pub service: Service,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub address: String,
    pub phone: String,
}

/// 予約を受け付けられない理由
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[display(fmt = "Please fill in required fields")]
    MissingFields,
    #[display(fmt = "Invalid phone number. Must start with 09 and be 11 digits.")]
    InvalidPhone,
    #[display(fmt = "We are closed on the selected date. Please choose another date.")]
    ClosedDate,
    #[display(fmt = "Operating hours are {} to {} only.", open, close)]
    OutsideOperatingHours { open: String, close: String },
    #[display(fmt = "This service is already booked at the same date and time.")]
    Duplicate,
    #[display(
        fmt = "Selected cleaner is not available at this time for the selected service duration."
    )]
    CleanerUnavailable,
    #[display(fmt = "Selected time overlaps with an existing booking for this service.")]
    ServiceOverlap,
}

impl Rejection {
    /// 入力の誤りか、既存予約との衝突か
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Rejection::Duplicate | Rejection::CleanerUnavailable | Rejection::ServiceOverlap
        )
    }
}

/// 登録前のチェックをすべて通ったら、正規化した枠を返す
pub fn admit(
    surface: Surface,
    request: &BookingRequest,
    existing: &[Booking],
    rules: &BookingRules,
) -> Result<ProposedSlot, Rejection> {
    let result = check(surface, request, existing, rules);
    match &result {
        Ok(slot) => debug!(?surface, date = %slot.date, start = %slot.start, "booking admitted"),
        Err(rejection) => debug!(?surface, %rejection, "booking rejected"),
    }
    result
}

fn check(
    surface: Surface,
    request: &BookingRequest,
    existing: &[Booking],
    rules: &BookingRules,
) -> Result<ProposedSlot, Rejection> {
    let date = request.date.ok_or(Rejection::MissingFields)?;
    if request.time.trim().is_empty()
        || request.address.trim().is_empty()
        || request.phone.trim().is_empty()
        || (surface == Surface::Admin && request.customer_id.is_none())
    {
        return Err(Rejection::MissingFields);
    }
    if !PHONE.is_match(request.phone.trim()) {
        return Err(Rejection::InvalidPhone);
    }
    if !rules.is_bookable_date(date) {
        return Err(Rejection::ClosedDate);
    }
    let start = TimeOfDay::lenient(&request.time);
    if !rules.is_bookable_time(start.minutes()) {
        return Err(Rejection::OutsideOperatingHours {
            open: rules.window.start.label(),
            close: rules.window.end.label(),
        });
    }

    let proposed = ProposedSlot {
        resource_id: request.resource_id.clone(),
        customer_id: request.customer_id.clone(),
        service_key: request.service.key().clone(),
        date,
        start,
        duration_minutes: request.service.duration_minutes(),
        exclude_booking_id: request.booking_id.clone(),
    };
    if is_duplicate_booking(&proposed, existing) {
        return Err(Rejection::Duplicate);
    }
    match surface {
        Surface::Admin => {
            if has_conflict(&proposed, existing, ConflictPolicy::ResourceBusy) {
                return Err(Rejection::CleanerUnavailable);
            }
        }
        Surface::Customer => {
            if has_service_overlap(&proposed, existing) {
                return Err(Rejection::ServiceOverlap);
            }
        }
    }
    Ok(proposed)
}
