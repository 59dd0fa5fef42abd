use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// 予約ステータス
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// 受付済み (清掃員未定)
    #[default]
    Pending,
    /// 清掃員に割り当て済み
    Assigned,
    /// 清掃員が承諾
    Confirmed,
    /// 作業中
    InProgress,
    /// 清掃員が辞退
    Declined,
    /// キャンセル
    Cancelled,
    /// 完了
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 7] = [
        BookingStatus::Pending,
        BookingStatus::Assigned,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Declined,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Assigned => "assigned",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Declined => "declined",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Assigned)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Assigned, BookingStatus::Confirmed)
                | (BookingStatus::Assigned, BookingStatus::Declined)
                | (BookingStatus::Assigned, BookingStatus::Cancelled)
                | (BookingStatus::Declined, BookingStatus::Assigned)
                | (BookingStatus::Confirmed, BookingStatus::InProgress)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::InProgress, BookingStatus::Completed)
        )
    }

    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, StatusError> {
        match self.can_transition_to(next) {
            true => Ok(next),
            false => Err(StatusError::InvalidTransition {
                from: self,
                to: next,
            }),
        }
    }

    /// 清掃員のスケジュール表での並び順
    pub fn schedule_rank(&self) -> u8 {
        match self {
            BookingStatus::Assigned => 0,
            BookingStatus::Confirmed => 1,
            BookingStatus::InProgress => 2,
            BookingStatus::Completed => 3,
            _ => 99,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| StatusError::Unknown(s.to_owned()))
    }
}

#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[display(fmt = "Unknown booking status: {}", _0)]
    Unknown(#[error(not(source))] String),
    #[display(fmt = "Invalid status transition from {} to {}", from, to)]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}
