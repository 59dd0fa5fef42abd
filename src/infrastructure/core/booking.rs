use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::core::{
    Booking, BookingId, BookingStatus, DurationMode, ServiceKey, StatusError, TimeOfDay,
};
use crate::infrastructure::{parse_display_date, RawId};

/// バックエンドの `GET /bookings` が返す予約レコード。
///
/// 画面ごとにフィールド名が揺れているので、ここで吸収してから [`Booking`] に変換する。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBooking {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub cleaner_id: Option<RawId>,
    #[serde(default, alias = "customer_id")]
    pub user_id: Option<RawId>,
    #[serde(default)]
    pub service_id: Option<RawId>,
    /// サービス名
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub raw_status: Option<String>,
    #[serde(default, alias = "phone_number")]
    pub phone: Option<String>,
}

impl RawBooking {
    pub fn into_booking(self, mode: DurationMode) -> Result<Booking, RecordError> {
        let id = self
            .id
            .and_then(RawId::into_id::<BookingId>)
            .ok_or(RecordError::MissingField("id"))?;
        let service_key = self
            .service_id
            .and_then(RawId::into_id::<ServiceKey>)
            .or_else(|| self.service.map(RawId::Text).and_then(RawId::into_id))
            .ok_or(RecordError::MissingField("service"))?;
        let date = match non_blank(self.date) {
            Some(text) => parse_display_date(&text).ok_or(RecordError::BadDate(text))?,
            None => return Err(RecordError::MissingField("date")),
        };
        let start = non_blank(self.time)
            .map(|text| TimeOfDay::lenient(&text))
            .ok_or(RecordError::MissingField("time"))?;
        let status = match non_blank(self.raw_status).or_else(|| non_blank(self.status)) {
            Some(text) => text.parse::<BookingStatus>()?,
            None => BookingStatus::Pending,
        };
        Ok(Booking {
            id,
            resource_id: self.cleaner_id.and_then(RawId::into_id),
            customer_id: self.user_id.and_then(RawId::into_id),
            service_key,
            date,
            start,
            duration_minutes: non_blank(self.duration).map(|text| mode.parse(&text)),
            status,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 予約レコードを変換できなかった理由
#[derive(Error, Display, Debug, From, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[display(fmt = "Missing field: {}", _0)]
    #[from(ignore)]
    MissingField(#[error(not(source))] &'static str),
    #[display(fmt = "Unreadable date: {}", _0)]
    #[from(ignore)]
    BadDate(#[error(not(source))] String),
    #[display(fmt = "Status error: {}", _0)]
    Status(#[error(source)] StatusError),
}

/// 変換できないレコードは警告を出して読み飛ばす
pub fn normalize_roster<I>(records: I, mode: DurationMode) -> Vec<Booking>
where
    I: IntoIterator<Item = RawBooking>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match record.into_booking(mode) {
                Ok(booking) => Some(booking),
                Err(error) => {
                    warn!(id = ?id, %error, "予約レコードを読み飛ばしました");
                    None
                }
            }
        })
        .collect()
}

/// JSON 配列の予約一覧を読み込む
pub fn parse_roster(json: &str, mode: DurationMode) -> Result<Vec<Booking>, serde_json::Error> {
    let records = serde_json::from_str::<Vec<RawBooking>>(json)?;
    Ok(normalize_roster(records, mode))
}
