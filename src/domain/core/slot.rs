use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    conflict::Occupancy, Booking, ConflictPolicy, OperatingWindow, ResourceId, Service, TimeOfDay,
    DEFAULT_DURATION_MINUTES,
};

/// 予約画面に並べる時間枠
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// `9:00 AM` 形式
    pub label: String,
    /// `09:00` 形式
    pub value: TimeOfDay,
    pub available: bool,
}

/// 営業時間をサービスの所要時間刻みで区切り、清掃員の予定と重ならない枠を示す。
pub fn enumerate_slots(
    date: NaiveDate,
    service: &Service,
    resource_id: &ResourceId,
    existing: &[Booking],
    window: OperatingWindow,
) -> Vec<Slot> {
    let step = match service.duration_minutes() {
        0 => DEFAULT_DURATION_MINUTES,
        minutes => minutes,
    };
    let occupancy = Occupancy::of_resource(
        resource_id,
        date,
        existing,
        ConflictPolicy::ResourceBusy,
        None,
        step,
    );
    (window.start.minutes()..=window.end.minutes())
        .step_by(step as usize)
        .map(TimeOfDay::from_minutes)
        .map(|start| Slot {
            label: start.label(),
            value: start,
            available: !occupancy.is_busy(start.window(step)),
        })
        .collect()
}
