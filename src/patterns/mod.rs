//! パターンライブラリ
//!
//! 金額・日付の書式（正規表現）と参照テーブルを一度だけ構築し、
//! プロセス全体で読み取り専用として共有する。
//!
//! ## 構成
//! - amount: 金額の書式、桁区切りの正規化、通貨記号
//! - date: 日付の書式、月名テーブル

pub mod amount;
pub mod date;

pub use amount::{AmountPattern, SeparatorStyle};
pub use date::DatePattern;

use regex::{Captures, Regex};
use std::ops::RangeInclusive;

/// 日付の正規化でシリアル値とみなす範囲
pub const SERIAL_PARSE_RANGE: RangeInclusive<f64> = 1.0..=100_000.0;

/// 列判定で日付らしいとみなすシリアル値の範囲（整数のみ）
///
/// 小さな整数は数量である可能性の方が高いので下限を 1000 にしている。
pub const SERIAL_PLAUSIBLE_RANGE: RangeInclusive<f64> = 1_000.0..=73_050.0;

/// 存在しない 1900/2/29 のシリアル値。これより大きい値は1日ずれている
pub const SERIAL_LEAP_BUG: f64 = 59.0;

/// 書式パターンの登録簿
pub struct PatternLibrary {
    amount: Vec<(AmountPattern, Regex)>,
    date: Vec<(DatePattern, Regex)>,
}

lazy_static::lazy_static! {
    static ref GLOBAL: PatternLibrary = PatternLibrary::new();
}

impl PatternLibrary {
    /// プロセス共有のインスタンス
    pub fn global() -> &'static PatternLibrary {
        &GLOBAL
    }

    fn new() -> Self {
        let amount = AmountPattern::ALL
            .iter()
            .map(|p| (*p, Regex::new(p.regex_source()).unwrap()))
            .collect();

        let date = DatePattern::GRAMMARS
            .iter()
            .filter_map(|p| p.regex_source().map(|src| (*p, Regex::new(src).unwrap())))
            .collect();

        Self { amount, date }
    }

    /// 最初に一致した金額書式
    pub fn match_amount_pattern(&self, text: &str) -> Option<AmountPattern> {
        let text = text.trim();
        self.amount
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(p, _)| *p)
    }

    /// 一致するすべての金額書式（宣言順）
    pub fn amount_patterns(&self, text: &str) -> Vec<AmountPattern> {
        let text = text.trim();
        self.amount
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn is_amount_pattern(&self, pattern: AmountPattern, text: &str) -> bool {
        self.amount
            .iter()
            .any(|(p, re)| *p == pattern && re.is_match(text.trim()))
    }

    /// 最初に一致した日付書式
    ///
    /// シリアル値の判定を先に行い、その後は宣言順に正規表現を試す。
    pub fn match_date_pattern(&self, text: &str) -> Option<DatePattern> {
        let text = text.trim();
        if self.serial_value(text).is_some() {
            return Some(DatePattern::ExcelSerial);
        }
        self.match_date_grammar(text)
    }

    /// 正規表現の日付書式だけを宣言順に試す
    pub fn match_date_grammar(&self, text: &str) -> Option<DatePattern> {
        let text = text.trim();
        self.date
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(p, _)| *p)
    }

    /// 指定した書式でキャプチャ
    pub fn date_captures<'t>(&self, pattern: DatePattern, text: &'t str) -> Option<Captures<'t>> {
        self.date
            .iter()
            .find(|(p, _)| *p == pattern)
            .and_then(|(_, re)| re.captures(text))
    }

    /// シリアル値として解釈できる数値
    pub fn serial_value(&self, text: &str) -> Option<f64> {
        amount::parse_finite(text).filter(|v| SERIAL_PARSE_RANGE.contains(v))
    }

    /// 列判定用: 日付らしい範囲の整数か
    pub fn is_plausible_serial(&self, text: &str) -> bool {
        amount::parse_finite(text)
            .map(|v| v.fract() == 0.0 && SERIAL_PLAUSIBLE_RANGE.contains(&v))
            .unwrap_or(false)
    }
}
