//! 日付の書式パターンと月名テーブル

use cellsense_common::DateFormatTag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 日付の書式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePattern {
    /// 01/15/2024
    MmDdYyyy,
    /// 15/01/2024（MM/DD/YYYY と同じ文字列パターン）
    DdMmYyyy,
    /// 2024-01-15
    YyyyMmDd,
    /// 15-Jan-2024
    DdMonYyyy,
    /// Q1 2024
    Quarter,
    /// Q1-24
    QuarterShort,
    /// March 2024
    MonthYear,
    /// 45306（表計算のシリアル値）
    ExcelSerial,
}

impl DatePattern {
    /// 正規表現で判別する書式（宣言順）
    pub const GRAMMARS: [DatePattern; 7] = [
        DatePattern::MmDdYyyy,
        DatePattern::DdMmYyyy,
        DatePattern::YyyyMmDd,
        DatePattern::DdMonYyyy,
        DatePattern::Quarter,
        DatePattern::QuarterShort,
        DatePattern::MonthYear,
    ];

    pub fn as_str(&self) -> &'static str {
        self.format_tag().as_str()
    }

    /// 表示用の書式名
    pub fn display_name(&self) -> &'static str {
        match self {
            DatePattern::MmDdYyyy => "MM/DD/YYYY",
            DatePattern::DdMmYyyy => "DD/MM/YYYY",
            DatePattern::YyyyMmDd => "YYYY-MM-DD",
            DatePattern::DdMonYyyy => "DD-MON-YYYY",
            DatePattern::Quarter => "Q# YYYY",
            DatePattern::QuarterShort => "Q#-YY",
            DatePattern::MonthYear => "Month YYYY",
            DatePattern::ExcelSerial => "Excel serial",
        }
    }

    pub fn format_tag(&self) -> DateFormatTag {
        match self {
            DatePattern::MmDdYyyy => DateFormatTag::MmDdYyyy,
            DatePattern::DdMmYyyy => DateFormatTag::DdMmYyyy,
            DatePattern::YyyyMmDd => DateFormatTag::YyyyMmDd,
            DatePattern::DdMonYyyy => DateFormatTag::DdMonYyyy,
            DatePattern::Quarter => DateFormatTag::Quarter,
            DatePattern::QuarterShort => DateFormatTag::QuarterShort,
            DatePattern::MonthYear => DateFormatTag::MonthYear,
            DatePattern::ExcelSerial => DateFormatTag::ExcelSerial,
        }
    }

    pub(crate) fn regex_source(&self) -> Option<&'static str> {
        match self {
            DatePattern::MmDdYyyy | DatePattern::DdMmYyyy => {
                Some(r"^(\d{1,2})/(\d{1,2})/(\d{4})$")
            }
            DatePattern::YyyyMmDd => Some(r"^(\d{4})-(\d{1,2})-(\d{1,2})$"),
            DatePattern::DdMonYyyy => Some(r"^(\d{1,2})-([A-Za-z]{3})-(\d{4})$"),
            DatePattern::Quarter => Some(r"(?i)^Q([1-4])\s+(\d{4})$"),
            DatePattern::QuarterShort => Some(r"(?i)^Q([1-4])-(\d{2})$"),
            DatePattern::MonthYear => Some(r"^([A-Za-z]+)\.?\s+(\d{4})$"),
            DatePattern::ExcelSerial => None,
        }
    }

    /// 月の文字列を含む書式か
    pub fn has_month_word(&self) -> bool {
        matches!(self, DatePattern::DdMonYyyy | DatePattern::MonthYear)
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 月の略称
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// 月の正式名称
pub const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// 3文字略称から月番号（1-12）
pub fn month_from_abbreviation(abbrev: &str) -> Option<u32> {
    let lower = abbrev.trim().to_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

/// 月名から月番号（1-12）
///
/// 正式名称のほか、3文字略称と `sept` も受け付ける。
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().trim_end_matches('.').to_lowercase();
    if lower == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
        .or_else(|| month_from_abbreviation(&lower))
}
