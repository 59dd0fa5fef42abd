use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::{DurationMode, TimeOfDay};

/// 営業時間の開始 (8:00 AM)
pub const OPENING_MINUTES: u32 = 8 * 60;
/// 営業時間の終了 (5:00 PM)。この時刻ちょうどの開始までは受け付ける。
pub const CLOSING_MINUTES: u32 = 17 * 60;

/// 1日の営業時間
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl OperatingWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// 開始時刻が営業時間内か (両端を含む)
    pub fn contains(&self, minutes: u32) -> bool {
        (self.start.minutes()..=self.end.minutes()).contains(&minutes)
    }
}

impl Default for OperatingWindow {
    fn default() -> Self {
        Self {
            start: TimeOfDay::from_minutes(OPENING_MINUTES),
            end: TimeOfDay::from_minutes(CLOSING_MINUTES),
        }
    }
}

/// 予約受付のルール
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingRules {
    pub window: OperatingWindow,
    pub closed_days: Vec<Weekday>,
    pub duration_mode: DurationMode,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            window: OperatingWindow::default(),
            closed_days: vec![Weekday::Sun],
            duration_mode: DurationMode::default(),
        }
    }
}

impl BookingRules {
    pub fn is_bookable_date(&self, date: NaiveDate) -> bool {
        !self.closed_days.contains(&date.weekday())
    }

    pub fn is_bookable_time(&self, minutes: u32) -> bool {
        self.window.contains(minutes)
    }

    /// 新規予約の既定日。翌日から数えて最初の営業日を返す。
    pub fn next_bookable_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        today
            .iter_days()
            .skip(1)
            .take(7)
            .find(|date| self.is_bookable_date(*date))
    }
}

/// 日曜日は受け付けない
pub fn is_bookable_date(date: NaiveDate) -> bool {
    date.weekday() != Weekday::Sun
}

/// 8:00 AM から 5:00 PM まで (両端を含む)
pub fn is_bookable_time(minutes: u32) -> bool {
    (OPENING_MINUTES..=CLOSING_MINUTES).contains(&minutes)
}
