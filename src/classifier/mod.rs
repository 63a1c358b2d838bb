//! 列の型判定モジュール
//!
//! 列から抜き出した値の並びを見て、文字列・数値・日付のどれかを判定する。
//!
//! ## 判定フロー
//! 1. null（既定では空白のみのセルも）を除き、先頭 `sample_limit` 件に絞る
//! 2. 日付らしい値の割合を数える
//! 3. 日付らしくない値のうち数値らしい値の割合を数える
//! 4. 過半数を占めた型に決める（日付 → 数値 → 文字列の順）

pub mod format_info;

use crate::patterns::date::{month_from_abbreviation, month_from_name};
use crate::patterns::{amount, AmountPattern, DatePattern, PatternLibrary};
use cellsense_common::{ClassificationResult, ColumnScores, Currency, FormatInfo, TypeLabel};
use rayon::prelude::*;

/// 判定に使う割合のしきい値
const MAJORITY: f64 = 0.5;

/// 判定の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierOptions {
    /// 空白のみのセルを null として扱う
    pub blank_as_null: bool,
    /// 判定に使う値の上限（None なら全件）
    pub sample_limit: Option<usize>,
    /// false のとき、未知の月名を含む値は日付とみなさない
    pub lenient_month_names: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            blank_as_null: true,
            sample_limit: None,
            lenient_month_names: true,
        }
    }
}

/// 列の型判定器
#[derive(Clone)]
pub struct ColumnClassifier {
    patterns: &'static PatternLibrary,
    options: ClassifierOptions,
}

lazy_static::lazy_static! {
    static ref DEFAULT_CLASSIFIER: ColumnClassifier =
        ColumnClassifier::new(ClassifierOptions::default());
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::new(ClassifierOptions::default())
    }
}

impl ColumnClassifier {
    pub fn new(options: ClassifierOptions) -> Self {
        Self {
            patterns: PatternLibrary::global(),
            options,
        }
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// 判定対象の値（null・空白を除き、件数を絞ったもの）
    fn sample<'a, S: AsRef<str>>(&self, values: &'a [Option<S>]) -> Vec<&'a str> {
        let limit = self.options.sample_limit.unwrap_or(usize::MAX);
        values
            .iter()
            .filter_map(|v| v.as_ref().map(|s| s.as_ref()))
            .filter(|s| !(self.options.blank_as_null && s.trim().is_empty()))
            .take(limit)
            .collect()
    }

    /// 列の型を判定する
    pub fn classify<S: AsRef<str>>(&self, values: &[Option<S>]) -> ClassificationResult {
        let sample = self.sample(values);
        if sample.is_empty() {
            tracing::debug!("empty sample, column type unknown");
            return ClassificationResult::unknown();
        }

        let (dates, rest): (Vec<&str>, Vec<&str>) =
            sample.iter().copied().partition(|v| self.is_date_like(v));
        let numbers: Vec<&str> = rest.into_iter().filter(|v| self.is_number_like(v)).collect();

        let total = sample.len() as f64;
        let date_score = dates.len() as f64 / total;
        let number_score = numbers.len() as f64 / total;
        let string_score = (1.0 - date_score - number_score).max(0.0);

        let label = if date_score > MAJORITY {
            TypeLabel::Date
        } else if number_score > MAJORITY {
            TypeLabel::Number
        } else {
            TypeLabel::String
        };

        tracing::debug!(
            samples = sample.len(),
            date_score,
            number_score,
            string_score,
            label = %label,
            "column classified"
        );

        let format_info = match label {
            TypeLabel::Date => FormatInfo::Date(self.date_format_info(&dates)),
            TypeLabel::Number => FormatInfo::Number(self.number_format_info(&numbers)),
            TypeLabel::String => FormatInfo::String(self.string_format_info(&sample)),
            TypeLabel::Unknown => FormatInfo::None,
        };

        ClassificationResult::from_scores(ColumnScores::decisive(label), format_info)
    }

    /// 日付らしい値か
    ///
    /// 日付らしい範囲の整数シリアル値か、日付の書式パターンに一致する値。
    /// 自由書式の日付は正規化では受け付けるが、判定では数えない。
    pub fn is_date_like(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        if self.patterns.is_plausible_serial(value) {
            return true;
        }
        self.patterns
            .match_date_grammar(value)
            .is_some_and(|pattern| self.month_word_known(pattern, value))
    }

    /// 数値らしい値か
    ///
    /// 通貨記号・カンマ・括弧・`-` を除いて数値になるか、桁略記の形か。
    pub fn is_number_like(&self, value: &str) -> bool {
        let value = value.trim();
        let stripped: String = value
            .chars()
            .filter(|c| !matches!(c, ',' | '(' | ')' | '-') && Currency::from_symbol(*c).is_none())
            .collect();
        amount::parse_finite(&stripped).is_some()
            || self.patterns.is_amount_pattern(AmountPattern::Abbreviated, value)
    }

    /// 月名を含む書式で、月名が解釈できるか（寛容モードなら常に true）
    fn month_word_known(&self, pattern: DatePattern, value: &str) -> bool {
        if self.options.lenient_month_names || !pattern.has_month_word() {
            return true;
        }
        let captures = match self.patterns.date_captures(pattern, value) {
            Some(caps) => caps,
            None => return false,
        };
        match pattern {
            DatePattern::DdMonYyyy => captures
                .get(2)
                .and_then(|m| month_from_abbreviation(m.as_str()))
                .is_some(),
            DatePattern::MonthYear => captures
                .get(1)
                .and_then(|m| month_from_name(m.as_str()))
                .is_some(),
            _ => true,
        }
    }
}

/// 既定設定で列の型を判定
pub fn classify_column<S: AsRef<str>>(values: &[Option<S>]) -> ClassificationResult {
    DEFAULT_CLASSIFIER.classify(values)
}

/// 複数列を並列に判定（結果は列の順）
pub fn classify_columns<S: AsRef<str> + Sync>(
    classifier: &ColumnClassifier,
    columns: &[Vec<Option<S>>],
) -> Vec<ClassificationResult> {
    columns
        .par_iter()
        .map(|column| classifier.classify(column))
        .collect()
}
