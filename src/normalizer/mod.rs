//! 正規化モジュール
//!
//! セルの文字列を型付きの値へ変換する。
//!
//! ## 構成
//! - amount: 金額（通貨記号、桁区切り、負数表記、桁略記）
//! - date: 日付（シリアル値、自由書式、書式パターン）
//! - calendar: 自由書式の日付パーサー
//! - validation: 列が期待する型に合っているかの検証
//!
//! どの関数もパニックせず、失敗は `ParseError` で返す。

pub mod amount;
pub mod calendar;
pub mod date;
pub mod validation;

pub use calendar::{CalendarTextParser, ChronoCalendarParser};

use crate::patterns::PatternLibrary;
use cellsense_common::{
    ClassificationResult, Currency, NormalizedColumn, ParseOutcome, ParsedAmount, ParsedDate,
    TypeLabel,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// `01/02/2024` のような数字だけの日付の読み方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// 月/日/年（米国式）
    #[default]
    MonthFirst,
    /// 日/月/年
    DayFirst,
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "month_first" | "mdy" | "us" => Ok(DateOrder::MonthFirst),
            "day_first" | "dmy" | "eu" => Ok(DateOrder::DayFirst),
            other => Err(format!("Unknown date order: {}", other)),
        }
    }
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateOrder::MonthFirst => write!(f, "month_first"),
            DateOrder::DayFirst => write!(f, "day_first"),
        }
    }
}

/// 正規化の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerOptions {
    pub date_order: DateOrder,
    /// 未知の月名を1月として扱う
    pub lenient_month_names: bool,
    /// 通貨記号がない金額に付ける通貨
    pub default_currency: Option<Currency>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            date_order: DateOrder::MonthFirst,
            lenient_month_names: true,
            default_currency: None,
        }
    }
}

/// 呼び出しごとの書式ヒント（設定より優先）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatHint {
    pub date_order: Option<DateOrder>,
    pub currency: Option<Currency>,
}

/// 正規化エンジン
///
/// パターンライブラリは共有の読み取り専用インスタンスを参照する。
/// 状態を持たないので、複数スレッドから同時に呼んでよい。
#[derive(Clone)]
pub struct Normalizer {
    patterns: &'static PatternLibrary,
    calendar: Arc<dyn CalendarTextParser>,
    options: NormalizerOptions,
}

lazy_static::lazy_static! {
    static ref DEFAULT_NORMALIZER: Normalizer = Normalizer::new(NormalizerOptions::default());
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerOptions::default())
    }
}

impl Normalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self {
            patterns: PatternLibrary::global(),
            calendar: Arc::new(ChronoCalendarParser),
            options,
        }
    }

    /// 自由書式の日付パーサーを差し替える
    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarTextParser>) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// 金額を正規化
    pub fn parse_amount(&self, raw: Option<&str>) -> ParseOutcome<ParsedAmount> {
        self.parse_amount_with_hint(raw, &FormatHint::default())
    }

    pub fn parse_amount_with_hint(
        &self,
        raw: Option<&str>,
        hint: &FormatHint,
    ) -> ParseOutcome<ParsedAmount> {
        amount::parse_amount(raw, &self.resolve(hint))
    }

    /// 日付を正規化
    pub fn parse_date(&self, raw: Option<&str>) -> ParseOutcome<ParsedDate> {
        self.parse_date_with_hint(raw, &FormatHint::default())
    }

    pub fn parse_date_with_hint(
        &self,
        raw: Option<&str>,
        hint: &FormatHint,
    ) -> ParseOutcome<ParsedDate> {
        let hint = self.resolve(hint);
        let context = date::DateContext {
            patterns: self.patterns,
            calendar: self.calendar.as_ref(),
            order: hint.date_order.unwrap_or(self.options.date_order),
            lenient_month_names: self.options.lenient_month_names,
        };
        date::parse_date(raw, &context)
    }

    /// 判定結果に従って列全体を正規化（セルの順序を保つ）
    pub fn normalize_column(
        &self,
        values: &[Option<String>],
        classification: &ClassificationResult,
    ) -> NormalizedColumn {
        tracing::debug!(
            label = %classification.label,
            cells = values.len(),
            "normalizing column"
        );
        match classification.label {
            TypeLabel::Number => NormalizedColumn::Amounts(
                values
                    .par_iter()
                    .map(|v| self.parse_amount(v.as_deref()))
                    .collect(),
            ),
            TypeLabel::Date => NormalizedColumn::Dates(
                values
                    .par_iter()
                    .map(|v| self.parse_date(v.as_deref()))
                    .collect(),
            ),
            TypeLabel::String | TypeLabel::Unknown => NormalizedColumn::Text(values.to_vec()),
        }
    }

    /// 設定値でヒントの空欄を埋める
    fn resolve(&self, hint: &FormatHint) -> FormatHint {
        FormatHint {
            date_order: hint.date_order.or(Some(self.options.date_order)),
            currency: hint.currency.or(self.options.default_currency),
        }
    }
}

/// 既定設定で金額を正規化
pub fn parse_amount(raw: Option<&str>) -> ParseOutcome<ParsedAmount> {
    DEFAULT_NORMALIZER.parse_amount(raw)
}

/// 既定設定で日付を正規化
pub fn parse_date(raw: Option<&str>) -> ParseOutcome<ParsedDate> {
    DEFAULT_NORMALIZER.parse_date(raw)
}
