use std::ops::Range;

use bio::data_structures::interval_tree::IntervalTree;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{
    overlaps, Booking, BookingId, BookingStatus, ProposedSlot, ResourceId,
    DEFAULT_DURATION_MINUTES,
};

/// どのステータスの予約が枠を占有しているとみなすか
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// 清掃員が引き受けた仕事だけが枠を埋める
    #[default]
    ResourceBusy,
    /// キャンセル以外はすべて枠を埋める
    AllowExceptCancelled,
}

impl ConflictPolicy {
    pub fn occupies(&self, status: BookingStatus) -> bool {
        match self {
            ConflictPolicy::ResourceBusy => matches!(
                status,
                BookingStatus::Confirmed | BookingStatus::InProgress | BookingStatus::Completed
            ),
            ConflictPolicy::AllowExceptCancelled => status != BookingStatus::Cancelled,
        }
    }
}

/// ある日の占有時間帯。
///
/// 木には終端を 1 分伸ばした区間を入れて長さ 0 の予約も拾い、最終判定は [`overlaps`] で行う。
pub(crate) struct Occupancy<'a> {
    tree: IntervalTree<u32, (Range<u32>, &'a Booking)>,
}

impl<'a> Occupancy<'a> {
    fn collect<I, W>(bookings: I, window: W) -> Self
    where
        I: IntoIterator<Item = &'a Booking>,
        W: Fn(&Booking) -> Range<u32>,
    {
        Self {
            tree: IntervalTree::from_iter(bookings.into_iter().map(|b| {
                let window = window(b);
                (widen(&window), (window, b))
            })),
        }
    }

    pub(crate) fn of_resource(
        resource_id: &ResourceId,
        date: NaiveDate,
        existing: &'a [Booking],
        policy: ConflictPolicy,
        exclude: Option<&BookingId>,
        fallback_minutes: u32,
    ) -> Self {
        Self::collect(
            existing.iter().filter(|b| {
                b.is_assigned_to(resource_id)
                    && b.date == date
                    && policy.occupies(b.status)
                    && exclude != Some(&b.id)
            }),
            |b| b.window(fallback_minutes),
        )
    }

    /// 指定した時間帯と重なる予約のうち最初に見つかったもの
    pub(crate) fn overlapping(&self, window: Range<u32>) -> Option<&'a Booking> {
        self.tree.find(widen(&window)).find_map(|entry| {
            let (busy, booking) = entry.data();
            overlaps(window.start, window.end, busy.start, busy.end).then_some(*booking)
        })
    }

    pub(crate) fn is_busy(&self, window: Range<u32>) -> bool {
        self.overlapping(window).is_some()
    }
}

fn widen(window: &Range<u32>) -> Range<u32> {
    window.start..window.end.saturating_add(1)
}

/// 清掃員の予定と提案された枠が重なるか。
///
/// 清掃員が決まっていない提案はどの予約とも衝突しない。
pub fn has_conflict(proposed: &ProposedSlot, existing: &[Booking], policy: ConflictPolicy) -> bool {
    let resource_id = match &proposed.resource_id {
        Some(resource_id) => resource_id,
        None => return false,
    };
    let occupancy = Occupancy::of_resource(
        resource_id,
        proposed.date,
        existing,
        policy,
        proposed.exclude_booking_id.as_ref(),
        proposed.duration_minutes,
    );
    match occupancy.overlapping(proposed.window()) {
        Some(booking) => {
            trace!(resource = %resource_id, date = %proposed.date, start = %proposed.start, with = %booking.id, "slot conflict");
            true
        }
        None => false,
    }
}

/// 同じサービスの予約と時間帯が重なるか (お客様画面での判定)。
///
/// 既存予約の長さには提案側のサービス所要時間を使う。
pub fn has_service_overlap(proposed: &ProposedSlot, existing: &[Booking]) -> bool {
    let policy = ConflictPolicy::AllowExceptCancelled;
    Occupancy::collect(
        existing.iter().filter(|b| {
            b.service_key == proposed.service_key
                && b.date == proposed.date
                && policy.occupies(b.status)
                && !proposed.excludes(&b.id)
        }),
        |b| b.start.window(proposed.duration_minutes),
    )
    .is_busy(proposed.window())
}

/// 同じお客様が同じサービスを同じ日時に予約済みか。重なりではなく完全一致で判定する。
///
/// お客様が分からない提案は重複とみなさない。
pub fn is_duplicate_booking(proposed: &ProposedSlot, existing: &[Booking]) -> bool {
    let customer_id = match &proposed.customer_id {
        Some(customer_id) => customer_id,
        None => return false,
    };
    existing.iter().any(|b| {
        b.customer_id.as_ref() == Some(customer_id)
            && b.service_key == proposed.service_key
            && b.date == proposed.date
            && b.start == proposed.start
            && b.status != BookingStatus::Cancelled
            && !proposed.excludes(&b.id)
    })
}

/// 承諾された仕事と重なる、同じ清掃員の未承諾の割り当て
pub fn overlapping_assignments<'a>(accepted: &Booking, existing: &'a [Booking]) -> Vec<&'a Booking> {
    let resource_id = match &accepted.resource_id {
        Some(resource_id) => resource_id,
        None => return Vec::new(),
    };
    let duration = accepted
        .duration_minutes
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    let window = accepted.start.window(duration);
    existing
        .iter()
        .filter(|b| {
            b.id != accepted.id
                && b.status == BookingStatus::Assigned
                && b.is_assigned_to(resource_id)
                && b.date == accepted.date
        })
        .filter(|b| {
            let other = b.window(duration);
            overlaps(window.start, window.end, other.start, other.end)
        })
        .collect()
}
