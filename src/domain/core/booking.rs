use chrono::NaiveDate;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::domain::Id;

use super::{BookingStatus, TimeOfDay};

/// 予約ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
pub struct BookingId(String);

impl Id for BookingId {}

/// 清掃員ID (ダブルブッキングを防ぐ対象のリソース)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
pub struct ResourceId(String);

impl Id for ResourceId {}

/// 予約したお客様のID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
pub struct CustomerId(String);

impl Id for CustomerId {}

/// サービスのIDまたは名前
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
pub struct ServiceKey(String);

impl Id for ServiceKey {}

/// 既存の予約
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub resource_id: Option<ResourceId>,
    pub customer_id: Option<CustomerId>,
    pub service_key: ServiceKey,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub duration_minutes: Option<u32>,
    pub status: BookingStatus,
}

impl Booking {
    /// 自身の所要時間がなければ `fallback` を使って時間帯を求める
    pub fn window(&self, fallback_minutes: u32) -> std::ops::Range<u32> {
        self.start
            .window(self.duration_minutes.unwrap_or(fallback_minutes))
    }

    pub fn is_assigned_to(&self, resource_id: &ResourceId) -> bool {
        self.resource_id.as_ref() == Some(resource_id)
    }
}

/// 予約しようとしている枠
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedSlot {
    pub resource_id: Option<ResourceId>,
    pub customer_id: Option<CustomerId>,
    pub service_key: ServiceKey,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub duration_minutes: u32,
    /// 編集中の予約自身とは衝突させない
    #[serde(default)]
    pub exclude_booking_id: Option<BookingId>,
}

impl ProposedSlot {
    pub fn window(&self) -> std::ops::Range<u32> {
        self.start.window(self.duration_minutes)
    }

    pub fn excludes(&self, id: &BookingId) -> bool {
        self.exclude_booking_id.as_ref() == Some(id)
    }
}

impl From<&Booking> for ProposedSlot {
    fn from(value: &Booking) -> Self {
        Self {
            resource_id: value.resource_id.clone(),
            customer_id: value.customer_id.clone(),
            service_key: value.service_key.clone(),
            date: value.date,
            start: value.start,
            duration_minutes: value.duration_minutes.unwrap_or(super::DEFAULT_DURATION_MINUTES),
            exclude_booking_id: Some(value.id.clone()),
        }
    }
}
