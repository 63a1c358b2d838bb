//! 自由書式の日付解釈
//!
//! 書式パターンより先に試す汎用パーサー。実装を差し替えられるよう trait にしている。

use super::DateOrder;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// 自由書式の日付パーサー
pub trait CalendarTextParser: Send + Sync {
    /// 解釈できれば日付と（あれば）時刻を返す
    fn parse(&self, text: &str, order: DateOrder) -> Option<(NaiveDate, Option<NaiveTime>)>;
}

/// 日時の書式（時刻付き）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// 月が先の日時書式
const MONTH_FIRST_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];

/// 日が先の日時書式
const DAY_FIRST_DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

/// 日付の書式（順序に依存しないもの）
///
/// `%B` は解析時に正式名称と3文字の略称の両方を受け付ける。
const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%d-%B-%y",
    "%Y年%m月%d日",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m-%d-%Y"];

const DAY_FIRST_DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%Y"];

/// chrono の書式一覧による既定実装
///
/// 書式パターン（MM/DD/YYYY, YYYY-MM-DD, DD-MON-YYYY など）そのものは扱わず、
/// それ以外の表記（月名入り、時刻付き、RFC 3339 など）を受け持つ。
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoCalendarParser;

impl ChronoCalendarParser {
    /// `%Y` は1桁から受け付けるため、4桁年以外の結果は捨てる
    fn plausible(date: NaiveDate) -> bool {
        (1000..=9999).contains(&date.year())
    }

    fn parse_datetime(text: &str, formats: &[&str]) -> Option<(NaiveDate, Option<NaiveTime>)> {
        formats
            .iter()
            .find_map(|fmt| {
                NaiveDateTime::parse_from_str(text, fmt)
                    .ok()
                    .filter(|dt| Self::plausible(dt.date()))
            })
            .map(|dt| (dt.date(), Some(dt.time())))
    }

    fn parse_date(text: &str, formats: &[&str]) -> Option<(NaiveDate, Option<NaiveTime>)> {
        formats
            .iter()
            .find_map(|fmt| {
                NaiveDate::parse_from_str(text, fmt)
                    .ok()
                    .filter(|d| Self::plausible(*d))
            })
            .map(|d| (d, None))
    }
}

impl CalendarTextParser for ChronoCalendarParser {
    fn parse(&self, text: &str, order: DateOrder) -> Option<(NaiveDate, Option<NaiveTime>)> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            let local = dt.naive_local();
            return Some((local.date(), Some(local.time())));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            let local = dt.naive_local();
            return Some((local.date(), Some(local.time())));
        }

        let (ordered_datetime, ordered_date) = match order {
            DateOrder::MonthFirst => (MONTH_FIRST_DATETIME_FORMATS, MONTH_FIRST_DATE_FORMATS),
            DateOrder::DayFirst => (DAY_FIRST_DATETIME_FORMATS, DAY_FIRST_DATE_FORMATS),
        };

        Self::parse_datetime(text, DATETIME_FORMATS)
            .or_else(|| Self::parse_datetime(text, ordered_datetime))
            .or_else(|| Self::parse_date(text, DATE_FORMATS))
            .or_else(|| Self::parse_date(text, ordered_date))
    }
}
