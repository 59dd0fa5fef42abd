pub mod core;

use std::fmt::{self, Display};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Id;

/// バックエンドが返す ID。数値のことも文字列のこともある。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    /// 空文字は ID なしとみなす
    pub fn into_id<I: Id>(self) -> Option<I> {
        let id = I::new(self);
        match id.is_blank() {
            true => None,
            false => Some(id),
        }
    }
}

impl Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => n.fmt(f),
            RawId::Text(s) => s.fmt(f),
        }
    }
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%m/%d/%Y", "%a, %b %d, %Y"];

/// ISO 形式と画面表示用の日付形式 (`Jun 10, 2024` など) を読み取る。
///
/// 日時が付いている場合 (`2024-06-10T09:00:00`、`2024-06-10 09:00:00`) は日付部分だけを使う。
pub fn parse_display_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let iso = text
        .get(..10)
        .filter(|_| matches!(text.as_bytes().get(10), Some(b'T') | Some(b' ')));
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(iso.unwrap_or(text), format).ok())
}

#[cfg(test)]
mod tests {
    use crate::domain::core::ResourceId;

    use super::*;

    #[test]
    fn test_parse_display_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 10);
        assert_eq!(parse_display_date("2024-06-10"), expected);
        assert_eq!(parse_display_date(" Jun 10, 2024 "), expected);
        assert_eq!(parse_display_date("June 10, 2024"), expected);
        assert_eq!(parse_display_date("06/10/2024"), expected);
        assert_eq!(parse_display_date("Mon, Jun 10, 2024"), expected);
        assert_eq!(parse_display_date("2024-06-10T00:00:00.000000Z"), expected);
        assert_eq!(parse_display_date("2024-06-10 09:00:00"), expected);
        assert_eq!(parse_display_date("tomorrow"), None);
        assert_eq!(parse_display_date(""), None);
    }

    #[test]
    fn test_raw_id() {
        let number: RawId = serde_json::from_str("12").unwrap();
        let text: RawId = serde_json::from_str("\" C-7 \"").unwrap();
        let blank: RawId = serde_json::from_str("\"\"").unwrap();
        assert_eq!(number.into_id(), Some(ResourceId::new("12")));
        assert_eq!(text.into_id(), Some(ResourceId::new("C-7")));
        assert_eq!(blank.into_id::<ResourceId>(), None);
    }
}
