use std::{fmt, ops::Range, str::FromStr};

use derive_more::{Deref, Display, Error, From};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// 所要時間が読み取れなかったときの既定値 (分)
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

static MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)").expect("valid regex"));
static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*h").expect("valid regex"));
static MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*m").expect("valid regex"));

/// 時刻 (0時からの経過分)
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    From,
    Deref,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub const fn from_hm(hour: u32, minute: u32) -> Self {
        Self(hour * 60 + minute)
    }

    /// 表示用の文字列をゆるく解釈する。読めない場合は 0時 になる。
    pub fn lenient(text: &str) -> Self {
        Self(to_minutes_since_midnight(text))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0 / 60
    }

    pub fn minute(&self) -> u32 {
        self.0 % 60
    }

    /// `h:mm AM` 形式の表示ラベル
    pub fn label(&self) -> String {
        let meridiem = if self.hour() >= 12 { "PM" } else { "AM" };
        let hour = match self.hour() % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour, self.minute(), meridiem)
    }

    /// 開始時刻と所要時間から半開区間を作る
    pub fn window(&self, duration_minutes: u32) -> Range<u32> {
        self.0..self.0.saturating_add(duration_minutes)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimeParseError::Empty);
        }
        let upper = s.to_ascii_uppercase();
        let (clock, meridiem) = match (upper.strip_suffix("AM"), upper.strip_suffix("PM")) {
            (Some(head), _) => (head.trim_end(), Some(false)),
            (_, Some(head)) => (head.trim_end(), Some(true)),
            _ => (upper.as_str(), None),
        };
        let mut parts = clock.split(':');
        let hour = strict_number(parts.next(), s)?;
        let minute = strict_number(parts.next(), s)?;
        match (parts.next(), meridiem) {
            (Some(seconds), None) => {
                strict_number(Some(seconds), s)?;
            }
            (None, _) => {}
            (Some(_), Some(_)) => return Err(TimeParseError::Malformed(s.to_owned())),
        }
        if parts.next().is_some() {
            return Err(TimeParseError::Malformed(s.to_owned()));
        }
        if minute >= 60 {
            return Err(TimeParseError::OutOfRange);
        }
        let hour = match meridiem {
            Some(pm) => {
                if !(1..=12).contains(&hour) {
                    return Err(TimeParseError::OutOfRange);
                }
                match (hour, pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, true) => h + 12,
                    (h, false) => h,
                }
            }
            None if hour < 24 => hour,
            None => return Err(TimeParseError::OutOfRange),
        };
        Ok(Self::from_hm(hour, minute))
    }
}

fn strict_number(part: Option<&str>, whole: &str) -> Result<u32, TimeParseError> {
    match part {
        Some(p) if !p.is_empty() && p.len() <= 2 && p.bytes().all(|b| b.is_ascii_digit()) => {
            p.parse().map_err(|_| TimeParseError::Malformed(whole.to_owned()))
        }
        _ => Err(TimeParseError::Malformed(whole.to_owned())),
    }
}

/// 時刻の厳密な解析エラー
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[display(fmt = "Time is empty")]
    Empty,
    #[display(fmt = "Malformed time: {}", _0)]
    Malformed(#[error(not(source))] String),
    #[display(fmt = "Time is out of range")]
    OutOfRange,
}

/// `HH:mm` / `HH:mm:ss` / `h:mm AM` のいずれかを 0時からの経過分に変換する。
///
/// 空文字や読めない入力は 0 (0時) として扱う。
pub fn to_minutes_since_midnight(text: &str) -> u32 {
    let text = text.trim();
    if let Some(caps) = MERIDIEM.captures(text) {
        let hour = caps[1].parse::<u32>().unwrap_or(0);
        let minute = caps[2].parse::<u32>().unwrap_or(0);
        let hour = match (hour, caps[3].eq_ignore_ascii_case("PM")) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return hour * 60 + minute;
    }
    let head = text.chars().take(5).collect::<String>();
    let mut parts = head.split(':');
    let hour = leading_number(parts.next());
    let minute = leading_number(parts.next());
    hour * 60 + minute
}

fn leading_number(part: Option<&str>) -> u32 {
    part.map(|p| {
        p.trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
    })
    .and_then(|digits| digits.parse().ok())
    .unwrap_or(0)
}

/// サービスの所要時間文字列を分に変換する。
///
/// 時間の指定があれば分の指定は無視される (`"1h 30m"` は 60)。
pub fn parse_duration_minutes(text: &str) -> u32 {
    match (capture_number(&HOURS, text), capture_number(&MINUTES, text)) {
        (Some(hours), _) => hours.saturating_mul(60),
        (None, Some(minutes)) => minutes,
        (None, None) => DEFAULT_DURATION_MINUTES,
    }
}

/// 時間と分を足し合わせて解釈する (`"1h 30m"` は 90)
pub fn parse_duration_minutes_additive(text: &str) -> u32 {
    match (capture_number(&HOURS, text), capture_number(&MINUTES, text)) {
        (None, None) => DEFAULT_DURATION_MINUTES,
        (hours, minutes) => hours
            .unwrap_or(0)
            .saturating_mul(60)
            .saturating_add(minutes.unwrap_or(0)),
    }
}

fn capture_number(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// 所要時間文字列の解釈方法
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationMode {
    /// 既存バックエンドと同じく時間指定を優先する
    #[default]
    HourPrecedence,
    /// 時間と分を合算する
    Additive,
}

impl DurationMode {
    pub fn parse(&self, text: &str) -> u32 {
        match self {
            DurationMode::HourPrecedence => parse_duration_minutes(text),
            DurationMode::Additive => parse_duration_minutes_additive(text),
        }
    }
}

/// 半開区間の重なり判定。端点が接しているだけなら重ならない。
pub fn overlaps(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes_since_midnight() {
        assert_eq!(to_minutes_since_midnight("14:30"), 870);
        assert_eq!(to_minutes_since_midnight("2:30 PM"), 870);
        assert_eq!(to_minutes_since_midnight("12:00 AM"), 0);
        assert_eq!(to_minutes_since_midnight("12:00 PM"), 720);
        assert_eq!(to_minutes_since_midnight("09:15:59"), 555);
        assert_eq!(to_minutes_since_midnight("9:05am"), 545);
    }

    #[test]
    fn test_to_minutes_since_midnight_degrades_to_midnight() {
        assert_eq!(to_minutes_since_midnight(""), 0);
        assert_eq!(to_minutes_since_midnight("soon"), 0);
        assert_eq!(to_minutes_since_midnight("9"), 540);
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration_minutes("1h 30m"), 60);
        assert_eq!(parse_duration_minutes("45m"), 45);
        assert_eq!(parse_duration_minutes("2 Hours"), 120);
        assert_eq!(parse_duration_minutes("90 mins"), 90);
        assert_eq!(parse_duration_minutes(""), 60);
        assert_eq!(parse_duration_minutes("half a day"), 60);
    }

    #[test]
    fn test_parse_duration_minutes_additive() {
        assert_eq!(parse_duration_minutes_additive("1h 30m"), 90);
        assert_eq!(parse_duration_minutes_additive("2h"), 120);
        assert_eq!(parse_duration_minutes_additive("15m"), 15);
        assert_eq!(parse_duration_minutes_additive("n/a"), 60);
        assert_eq!(DurationMode::Additive.parse("1 hour 15 min"), 75);
        assert_eq!(DurationMode::HourPrecedence.parse("1 hour 15 min"), 60);
    }

    #[test]
    fn test_overlaps() {
        assert!(overlaps(540, 600, 570, 630));
        assert!(overlaps(540, 600, 540, 600));
        assert!(!overlaps(540, 600, 600, 660));
        assert!(!overlaps(600, 660, 540, 600));
        assert!(!overlaps(480, 500, 700, 760));
    }

    #[test]
    fn test_time_of_day_display() {
        let time = TimeOfDay::from_minutes(870);
        assert_eq!(time.to_string(), "14:30");
        assert_eq!(time.label(), "2:30 PM");
        assert_eq!(TimeOfDay::from_hm(0, 5).label(), "12:05 AM");
        assert_eq!(TimeOfDay::from_hm(12, 0).label(), "12:00 PM");
        assert_eq!(TimeOfDay::from_hm(8, 0).label(), "8:00 AM");
    }

    #[test]
    fn test_time_of_day_from_str() {
        assert_eq!("08:00".parse::<TimeOfDay>(), Ok(TimeOfDay::from_hm(8, 0)));
        assert_eq!("17:00:00".parse::<TimeOfDay>(), Ok(TimeOfDay::from_hm(17, 0)));
        assert_eq!("2:30 pm".parse::<TimeOfDay>(), Ok(TimeOfDay::from_hm(14, 30)));
        assert_eq!("12:15 AM".parse::<TimeOfDay>(), Ok(TimeOfDay::from_hm(0, 15)));
        assert_eq!("".parse::<TimeOfDay>(), Err(TimeParseError::Empty));
        assert_eq!("25:00".parse::<TimeOfDay>(), Err(TimeParseError::OutOfRange));
        assert_eq!("13:00 PM".parse::<TimeOfDay>(), Err(TimeParseError::OutOfRange));
        assert!(matches!(
            "noon".parse::<TimeOfDay>(),
            Err(TimeParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_time_of_day_serde() {
        let time: TimeOfDay = serde_json::from_str("\"09:30\"").unwrap();
        assert_eq!(time, TimeOfDay::from_hm(9, 30));
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"09:30\"");
    }
}
