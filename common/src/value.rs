//! 正規化済みの値型
//!
//! - ParsedAmount: 金額（絶対値 + 符号 + 通貨）
//! - ParsedDate: 日付（どの書式で解釈したかの由来付き）

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Inr,
    Gbp,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Inr,
        Currency::Gbp,
        Currency::Jpy,
    ];

    /// ISO 4217 コード
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Inr => "INR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Currency::Usd => '$',
            Currency::Eur => '€',
            Currency::Inr => '₹',
            Currency::Gbp => '£',
            Currency::Jpy => '¥',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.symbol() == symbol)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 桁略記（K/M/B/T）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Abbreviation {
    K,
    M,
    B,
    T,
}

impl Abbreviation {
    pub fn multiplier(&self) -> f64 {
        match self {
            Abbreviation::K => 1e3,
            Abbreviation::M => 1e6,
            Abbreviation::B => 1e9,
            Abbreviation::T => 1e12,
        }
    }

    /// 末尾の1文字から判定（大文字小文字は区別しない）
    pub fn from_suffix(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'K' => Some(Abbreviation::K),
            'M' => Some(Abbreviation::M),
            'B' => Some(Abbreviation::B),
            'T' => Some(Abbreviation::T),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Abbreviation::K => 'K',
            Abbreviation::M => 'M',
            Abbreviation::B => 'B',
            Abbreviation::T => 'T',
        }
    }
}

impl fmt::Display for Abbreviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 金額の解釈に使った規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountFormatTag {
    Standard,
    ParenthesesNegative,
    TrailingNegative,
    Abbreviated,
}

impl AmountFormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountFormatTag::Standard => "standard",
            AmountFormatTag::ParenthesesNegative => "parentheses_negative",
            AmountFormatTag::TrailingNegative => "trailing_negative",
            AmountFormatTag::Abbreviated => "abbreviated",
        }
    }
}

impl fmt::Display for AmountFormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 正規化済み金額
///
/// `value` は常に絶対値。符号は `is_negative` だけが持つ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAmount {
    pub value: f64,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub is_negative: bool,
    #[serde(default)]
    pub format_tag: Option<AmountFormatTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<Abbreviation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_value: Option<f64>,
}

impl ParsedAmount {
    /// 絶対値と符号から生成（負の値を渡しても絶対値に揃える）
    pub fn new(value: f64, is_negative: bool, format_tag: AmountFormatTag) -> Self {
        Self {
            value: value.abs(),
            currency: None,
            is_negative,
            format_tag: Some(format_tag),
            abbreviation: None,
            multiplier: None,
            base_value: None,
        }
    }

    pub fn with_currency(mut self, currency: Option<Currency>) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_abbreviation(mut self, abbreviation: Abbreviation, base_value: f64) -> Self {
        self.abbreviation = Some(abbreviation);
        self.multiplier = Some(abbreviation.multiplier());
        self.base_value = Some(base_value.abs());
        self
    }

    /// 符号付きの値（保存層での集計用）
    pub fn signed_value(&self) -> f64 {
        if self.is_negative {
            -self.value
        } else {
            self.value
        }
    }

    /// 再解析しても同じ値になる正規表記
    ///
    /// 小数部がちょうど3桁だと欧州式の桁区切りと読まれるため、0を1つ補う。
    pub fn canonical(&self) -> String {
        let mut digits = format!("{}", self.value);
        if let Some(dot) = digits.find('.') {
            if digits.len() - dot - 1 == 3 {
                digits.push('0');
            }
        }

        let sign = if self.is_negative { "-" } else { "" };
        match self.currency {
            Some(currency) => format!("{}{}{}", sign, currency.symbol(), digits),
            None => format!("{}{}", sign, digits),
        }
    }
}

/// 日付の解釈に使った書式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormatTag {
    ExcelSerial,
    /// 自由書式パーサーで解釈した日付
    #[serde(rename = "dateutil_parsed")]
    FreeForm,
    MmDdYyyy,
    DdMmYyyy,
    YyyyMmDd,
    DdMonYyyy,
    Quarter,
    QuarterShort,
    MonthYear,
}

impl DateFormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormatTag::ExcelSerial => "excel_serial",
            DateFormatTag::FreeForm => "dateutil_parsed",
            DateFormatTag::MmDdYyyy => "mm_dd_yyyy",
            DateFormatTag::DdMmYyyy => "dd_mm_yyyy",
            DateFormatTag::YyyyMmDd => "yyyy_mm_dd",
            DateFormatTag::DdMonYyyy => "dd_mon_yyyy",
            DateFormatTag::Quarter => "quarter",
            DateFormatTag::QuarterShort => "quarter_short",
            DateFormatTag::MonthYear => "month_year",
        }
    }
}

impl fmt::Display for DateFormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 正規化済み日付
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDate {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    pub format_tag: DateFormatTag,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_name: Option<String>,
}

impl ParsedDate {
    /// 年月日は `date` から導出するので常に整合する
    pub fn new(date: NaiveDate, format_tag: DateFormatTag) -> Self {
        Self {
            date,
            time: None,
            format_tag,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            quarter: None,
            serial: None,
            month_name: None,
        }
    }

    pub fn with_time(mut self, time: Option<NaiveTime>) -> Self {
        self.time = time;
        self
    }

    pub fn with_quarter(mut self, quarter: u32) -> Self {
        self.quarter = Some(quarter);
        self
    }

    pub fn with_serial(mut self, serial: f64) -> Self {
        self.serial = Some(serial);
        self
    }

    pub fn with_month_name(mut self, name: &str) -> Self {
        self.month_name = Some(name.to_string());
        self
    }

    /// 時刻なしの場合は 00:00:00
    pub fn datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    /// 再解析しても同じ日付になる正規表記（ISO 8601）
    ///
    /// 秒の端数は端数があるときだけ付く。
    pub fn canonical(&self) -> String {
        match self.time {
            Some(time) => format!(
                "{} {}",
                self.date.format("%Y-%m-%d"),
                time.format("%H:%M:%S%.f")
            ),
            None => self.date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_lookup() {
        assert_eq!(Currency::from_symbol('€'), Some(Currency::Eur));
        assert_eq!(Currency::from_symbol('#'), None);
        assert_eq!(Currency::from_code("gbp"), Some(Currency::Gbp));
        assert_eq!(Currency::Jpy.to_string(), "JPY");
    }

    #[test]
    fn test_currency_serialize_as_code() {
        let json = serde_json::to_string(&Currency::Inr).unwrap();
        assert_eq!(json, "\"INR\"");
    }

    #[test]
    fn test_abbreviation_multiplier() {
        assert_eq!(Abbreviation::from_suffix('k'), Some(Abbreviation::K));
        assert_eq!(Abbreviation::from_suffix('x'), None);
        assert_eq!(Abbreviation::B.multiplier(), 1_000_000_000.0);
        assert_eq!(Abbreviation::T.multiplier(), 1_000_000_000_000.0);
    }

    #[test]
    fn test_parsed_amount_keeps_magnitude() {
        let amount = ParsedAmount::new(-12.5, true, AmountFormatTag::Standard);
        assert_eq!(amount.value, 12.5);
        assert_eq!(amount.signed_value(), -12.5);
    }

    #[test]
    fn test_parsed_amount_canonical() {
        let amount = ParsedAmount::new(1234.56, true, AmountFormatTag::Standard)
            .with_currency(Some(Currency::Usd));
        assert_eq!(amount.canonical(), "-$1234.56");

        // 小数3桁は0を補う
        let amount = ParsedAmount::new(1.125, false, AmountFormatTag::Standard);
        assert_eq!(amount.canonical(), "1.1250");
    }

    #[test]
    fn test_parsed_date_fields_follow_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let parsed = ParsedDate::new(date, DateFormatTag::YyyyMmDd);
        assert_eq!((parsed.year, parsed.month, parsed.day), (2024, 2, 29));
        assert_eq!(parsed.canonical(), "2024-02-29");
    }

    #[test]
    fn test_parsed_date_serialize() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        let parsed = ParsedDate::new(date, DateFormatTag::Quarter).with_quarter(4);

        let json = serde_json::to_string(&parsed).expect("シリアライズ失敗");
        assert!(json.contains("\"formatTag\":\"quarter\""));
        assert!(json.contains("\"quarter\":4"));
        assert!(!json.contains("serial"));
    }

    #[test]
    fn test_free_form_tag_name() {
        let json = serde_json::to_string(&DateFormatTag::FreeForm).unwrap();
        assert_eq!(json, "\"dateutil_parsed\"");
        assert_eq!(DateFormatTag::FreeForm.to_string(), "dateutil_parsed");
    }

    #[test]
    fn test_canonical_keeps_fraction() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let parsed = ParsedDate::new(date, DateFormatTag::FreeForm)
            .with_time(NaiveTime::from_hms_milli_opt(9, 30, 0, 500));
        assert_eq!(parsed.canonical(), "2024-03-05 09:30:00.500");

        let parsed = parsed.with_time(NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parsed.canonical(), "2024-03-05 09:30:00");
    }
}
