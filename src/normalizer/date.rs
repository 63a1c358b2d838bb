//! 日付の正規化
//!
//! 規則を優先順に試す:
//! 1. 表計算のシリアル値（1〜100000）
//! 2. 自由書式（月名入り、時刻付き、RFC 3339 など）
//! 3. 書式パターン（MM/DD/YYYY と DD/MM/YYYY は設定の順）

use super::calendar::CalendarTextParser;
use super::DateOrder;
use crate::patterns::date::{month_from_abbreviation, month_from_name};
use crate::patterns::{DatePattern, PatternLibrary, SERIAL_LEAP_BUG};
use cellsense_common::{DateFormatTag, ParseError, ParseOutcome, ParsedDate};
use chrono::{Days, NaiveDate, NaiveTime};
use regex::Captures;

/// 1日の秒数
const SECONDS_PER_DAY: f64 = 86_400.0;

/// 日付の正規化に必要な参照
pub(crate) struct DateContext<'a> {
    pub patterns: &'static PatternLibrary,
    pub calendar: &'a dyn CalendarTextParser,
    pub order: DateOrder,
    pub lenient_month_names: bool,
}

/// 日付の解釈規則
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    Serial,
    FreeForm,
    Grammar(DatePattern),
}

impl DateRule {
    /// 日付の並び順に応じた規則の順序
    pub fn ordered(order: DateOrder) -> Vec<DateRule> {
        let (first, second) = match order {
            DateOrder::MonthFirst => (DatePattern::MmDdYyyy, DatePattern::DdMmYyyy),
            DateOrder::DayFirst => (DatePattern::DdMmYyyy, DatePattern::MmDdYyyy),
        };

        let mut rules = vec![
            DateRule::Serial,
            DateRule::FreeForm,
            DateRule::Grammar(first),
            DateRule::Grammar(second),
        ];
        rules.extend(
            DatePattern::GRAMMARS
                .iter()
                .filter(|p| !matches!(p, DatePattern::MmDdYyyy | DatePattern::DdMmYyyy))
                .map(|p| DateRule::Grammar(*p)),
        );
        rules
    }
}

/// 規則ごとの結果
enum Attempt {
    /// 形が合わない
    Skip,
    /// 形は合ったが日付にならない
    Rejected(String),
    Parsed(ParsedDate),
}

/// 日付を正規化する
pub(crate) fn parse_date(raw: Option<&str>, context: &DateContext<'_>) -> ParseOutcome<ParsedDate> {
    let original = match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(ParseError::empty(raw)),
    };
    let text = original.trim();

    let mut last_reason: Option<String> = None;
    for rule in DateRule::ordered(context.order) {
        match attempt(rule, text, context) {
            Attempt::Parsed(date) => {
                tracing::trace!(rule = ?rule, value = text, "date rule matched");
                return Ok(date);
            }
            Attempt::Rejected(reason) => last_reason = Some(reason),
            Attempt::Skip => {}
        }
    }

    Err(ParseError::unrecognized_date(
        original,
        last_reason.unwrap_or_else(|| "no known date format matched".to_string()),
    ))
}

fn attempt(rule: DateRule, text: &str, context: &DateContext<'_>) -> Attempt {
    match rule {
        DateRule::Serial => match context.patterns.serial_value(text) {
            Some(serial) => from_serial(serial),
            None => Attempt::Skip,
        },
        DateRule::FreeForm => match context.calendar.parse(text, context.order) {
            Some((date, time)) => {
                Attempt::Parsed(ParsedDate::new(date, DateFormatTag::FreeForm).with_time(time))
            }
            None => Attempt::Skip,
        },
        DateRule::Grammar(pattern) => match context.patterns.date_captures(pattern, text) {
            Some(caps) => from_grammar(pattern, &caps, context.lenient_month_names),
            None => Attempt::Skip,
        },
    }
}

/// シリアル値 → 日付
///
/// 1 = 1900-01-01。59 より大きい値は存在しない 1900-02-29 の分を差し引く。
/// 小数部は時刻（秒に丸め、23:59:59 が上限）。
fn from_serial(serial: f64) -> Attempt {
    let mut days = serial.trunc();
    if serial > SERIAL_LEAP_BUG {
        days -= 1.0;
    }

    let date = NaiveDate::from_ymd_opt(1899, 12, 31)
        .and_then(|epoch| epoch.checked_add_days(Days::new(days as u64)));
    let date = match date {
        Some(date) => date,
        None => return Attempt::Rejected(format!("serial {} is out of range", serial)),
    };

    let fraction = serial.fract();
    let time = if fraction > 0.0 {
        let seconds = (fraction * SECONDS_PER_DAY).round().min(SECONDS_PER_DAY - 1.0) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
    } else {
        None
    };

    Attempt::Parsed(
        ParsedDate::new(date, DateFormatTag::ExcelSerial)
            .with_time(time)
            .with_serial(serial),
    )
}

fn capture_number<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn build(pattern: DatePattern, year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Attempt {
    let (year, month, day) = match (year, month, day) {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        _ => return Attempt::Rejected(format!("malformed {}", pattern.display_name())),
    };
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Attempt::Parsed(ParsedDate::new(date, pattern.format_tag())),
        None => Attempt::Rejected(format!(
            "invalid calendar date for {}: {}-{}-{}",
            pattern.display_name(),
            year,
            month,
            day
        )),
    }
}

fn from_grammar(pattern: DatePattern, caps: &Captures<'_>, lenient: bool) -> Attempt {
    match pattern {
        DatePattern::MmDdYyyy => build(
            pattern,
            capture_number(caps, 3),
            capture_number(caps, 1),
            capture_number(caps, 2),
        ),
        DatePattern::DdMmYyyy => build(
            pattern,
            capture_number(caps, 3),
            capture_number(caps, 2),
            capture_number(caps, 1),
        ),
        DatePattern::YyyyMmDd => build(
            pattern,
            capture_number(caps, 1),
            capture_number(caps, 2),
            capture_number(caps, 3),
        ),
        DatePattern::DdMonYyyy => {
            let word = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            match resolve_month(month_from_abbreviation(word), word, lenient) {
                Ok(month) => build(
                    pattern,
                    capture_number(caps, 3),
                    Some(month),
                    capture_number(caps, 1),
                ),
                Err(reason) => Attempt::Rejected(reason),
            }
        }
        DatePattern::Quarter | DatePattern::QuarterShort => {
            let quarter: Option<u32> = capture_number(caps, 1);
            let year: Option<i32> = if pattern == DatePattern::QuarterShort {
                capture_number::<i32>(caps, 2).map(|yy| 2000 + yy)
            } else {
                capture_number(caps, 2)
            };
            match (quarter, build(pattern, year, quarter.map(|q| (q - 1) * 3 + 1), Some(1))) {
                (Some(q), Attempt::Parsed(date)) => Attempt::Parsed(date.with_quarter(q)),
                (_, other) => other,
            }
        }
        DatePattern::MonthYear => {
            let word = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match resolve_month(month_from_name(word), word, lenient) {
                Ok(month) => match build(pattern, capture_number(caps, 2), Some(month), Some(1)) {
                    Attempt::Parsed(date) => Attempt::Parsed(date.with_month_name(word)),
                    other => other,
                },
                Err(reason) => Attempt::Rejected(reason),
            }
        }
        DatePattern::ExcelSerial => Attempt::Skip,
    }
}

/// 未知の月名は寛容モードなら1月
fn resolve_month(month: Option<u32>, word: &str, lenient: bool) -> Result<u32, String> {
    match month {
        Some(month) => Ok(month),
        None if lenient => {
            tracing::debug!(word, "unknown month name, using January");
            Ok(1)
        }
        None => Err(format!("unknown month name '{}'", word)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::ChronoCalendarParser;
    use cellsense_common::ParseErrorKind;

    fn parse_with(text: &str, order: DateOrder, lenient: bool) -> ParseOutcome<ParsedDate> {
        let calendar = ChronoCalendarParser;
        let context = DateContext {
            patterns: PatternLibrary::global(),
            calendar: &calendar,
            order,
            lenient_month_names: lenient,
        };
        parse_date(Some(text), &context)
    }

    fn parse(text: &str) -> ParseOutcome<ParsedDate> {
        parse_with(text, DateOrder::MonthFirst, true)
    }

    #[test]
    fn test_rule_order() {
        let rules = DateRule::ordered(DateOrder::DayFirst);
        assert_eq!(rules[0], DateRule::Serial);
        assert_eq!(rules[1], DateRule::FreeForm);
        assert_eq!(rules[2], DateRule::Grammar(DatePattern::DdMmYyyy));
        assert_eq!(rules[3], DateRule::Grammar(DatePattern::MmDdYyyy));
        assert_eq!(rules.len(), 9);
    }

    #[test]
    fn test_serial_epoch_and_leap_bug() {
        assert_eq!(parse("1").unwrap().canonical(), "1900-01-01");
        assert_eq!(parse("59").unwrap().canonical(), "1900-02-28");
        assert_eq!(parse("61").unwrap().canonical(), "1900-03-01");
        assert_eq!(parse("44927").unwrap().canonical(), "2023-01-01");
    }

    #[test]
    fn test_serial_fraction_becomes_time() {
        let date = parse("45000.5").unwrap();
        assert_eq!(date.time, NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(date.serial, Some(45000.5));
        assert_eq!(date.format_tag, DateFormatTag::ExcelSerial);

        let late = parse("45000.9999999").unwrap();
        assert_eq!(late.time, NaiveTime::from_hms_opt(23, 59, 59));
    }

    #[test]
    fn test_serial_out_of_range_is_not_a_date() {
        let err = parse("100001").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnrecognizedDateFormat);
        assert!(parse("0").is_err());
    }

    #[test]
    fn test_slash_dates_follow_order() {
        let date = parse("01/15/2024").unwrap();
        assert_eq!(date.format_tag, DateFormatTag::MmDdYyyy);
        assert_eq!((date.month, date.day), (1, 15));

        // 月として不正なら日/月/年で読み直す
        let date = parse("15/01/2024").unwrap();
        assert_eq!(date.format_tag, DateFormatTag::DdMmYyyy);
        assert_eq!((date.month, date.day), (1, 15));

        let date = parse_with("05/06/2024", DateOrder::DayFirst, true).unwrap();
        assert_eq!(date.format_tag, DateFormatTag::DdMmYyyy);
        assert_eq!((date.month, date.day), (6, 5));
    }

    #[test]
    fn test_invalid_calendar_date() {
        let err = parse("2023-02-30").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnrecognizedDateFormat);
        assert!(err.reason().contains("invalid calendar date"));

        assert!(parse("13/13/2024").is_err());
    }

    #[test]
    fn test_dd_mon_yyyy() {
        let date = parse("15-Mar-2024").unwrap();
        assert_eq!(date.format_tag, DateFormatTag::DdMonYyyy);
        assert_eq!(date.canonical(), "2024-03-15");

        // 未知の略称
        assert_eq!(parse("15-Xyz-2024").unwrap().month, 1);
        assert!(parse_with("15-Xyz-2024", DateOrder::MonthFirst, false).is_err());
    }

    #[test]
    fn test_quarters() {
        let date = parse("Q3 2023").unwrap();
        assert_eq!(date.canonical(), "2023-07-01");
        assert_eq!(date.quarter, Some(3));

        let date = parse("q4-22").unwrap();
        assert_eq!(date.canonical(), "2022-10-01");
        assert_eq!(date.format_tag, DateFormatTag::QuarterShort);
    }

    #[test]
    fn test_month_year() {
        let date = parse("March 2024").unwrap();
        assert_eq!(date.canonical(), "2024-03-01");
        assert_eq!(date.month_name.as_deref(), Some("March"));

        let date = parse("Sept. 2023").unwrap();
        assert_eq!(date.month, 9);

        assert!(parse_with("Total 2024", DateOrder::MonthFirst, false).is_err());
    }

    #[test]
    fn test_free_form() {
        let date = parse("Jan 5, 2024").unwrap();
        assert_eq!(date.format_tag, DateFormatTag::FreeForm);
        assert_eq!(date.canonical(), "2024-01-05");
    }

    #[test]
    fn test_unrecognized_keeps_original() {
        let err = parse("  not a date ").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnrecognizedDateFormat);
        assert_eq!(err.original_text(), "  not a date ");
    }

    #[test]
    fn test_empty_values() {
        let calendar = ChronoCalendarParser;
        let context = DateContext {
            patterns: PatternLibrary::global(),
            calendar: &calendar,
            order: DateOrder::MonthFirst,
            lenient_month_names: true,
        };
        assert_eq!(
            parse_date(None, &context).unwrap_err().kind(),
            ParseErrorKind::EmptyValue
        );
        assert_eq!(
            parse_date(Some("   "), &context).unwrap_err().kind(),
            ParseErrorKind::EmptyValue
        );
    }
}
