//! 列判定の型定義
//!
//! 判定エンジンと保存層で共有される型:
//! - TypeLabel / ClassificationResult: 列の型判定結果
//! - FormatInfo: 判定した型ごとの書式メタデータ
//! - NormalizedColumn: 保存層へ渡す正規化済みの列

use crate::error::ParseOutcome;
use crate::value::{ParsedAmount, ParsedDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 列の型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeLabel {
    String,
    Number,
    Date,
    Unknown,
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeLabel::String => write!(f, "string"),
            TypeLabel::Number => write!(f, "number"),
            TypeLabel::Date => write!(f, "date"),
            TypeLabel::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for TypeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Ok(TypeLabel::String),
            "number" | "amount" => Ok(TypeLabel::Number),
            "date" => Ok(TypeLabel::Date),
            "unknown" => Ok(TypeLabel::Unknown),
            other => Err(format!("Unknown type label: {}", other)),
        }
    }
}

/// 型ごとのスコア
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnScores {
    pub string: f64,
    pub number: f64,
    pub date: f64,
}

impl ColumnScores {
    /// 1つの型だけを 1.0 にしたスコア
    pub fn decisive(label: TypeLabel) -> Self {
        match label {
            TypeLabel::Date => Self { date: 1.0, ..Default::default() },
            TypeLabel::Number => Self { number: 1.0, ..Default::default() },
            TypeLabel::String => Self { string: 1.0, ..Default::default() },
            TypeLabel::Unknown => Self::default(),
        }
    }

    /// 最大スコアの型とその値
    ///
    /// 同点の場合は string → number → date の順で先勝ち。
    pub fn best(&self) -> (TypeLabel, f64) {
        let mut best = (TypeLabel::String, self.string);
        if self.number > best.1 {
            best = (TypeLabel::Number, self.number);
        }
        if self.date > best.1 {
            best = (TypeLabel::Date, self.date);
        }
        best
    }
}

/// 日付列の書式情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFormatInfo {
    /// 一致した書式タグ（重複なし）
    pub detected_patterns: BTreeSet<String>,
    pub excel_serial_dates: bool,
    pub excel_date_count: usize,
    /// 先頭5件までのシリアル値
    pub sample_excel_dates: Vec<f64>,
}

/// 数値列の書式情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormatInfo {
    pub currency_symbols: BTreeSet<char>,
    pub decimal_separators: BTreeSet<char>,
    pub thousand_separators: BTreeSet<char>,
    /// 負数表記の実例（重複なし）
    pub negative_formats: BTreeSet<String>,
    pub abbreviated_formats: bool,
}

/// 文字列列の内容分類（参考情報のみ、型判定には使わない）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFormatInfo {
    pub account_related: usize,
    pub transaction_related: usize,
    pub company_related: usize,
    pub sample_accounts: Vec<String>,
    pub sample_transactions: Vec<String>,
    pub sample_companies: Vec<String>,
}

/// 判定した型に応じた書式情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatInfo {
    Date(DateFormatInfo),
    Number(NumberFormatInfo),
    String(StringFormatInfo),
    #[default]
    None,
}

/// 列の型判定結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: TypeLabel,
    pub confidence: f64,
    pub scores: ColumnScores,
    #[serde(default)]
    pub format_info: FormatInfo,
}

impl ClassificationResult {
    /// 空の列（null除去後に値がない）
    pub fn unknown() -> Self {
        Self {
            label: TypeLabel::Unknown,
            confidence: 0.0,
            scores: ColumnScores::default(),
            format_info: FormatInfo::None,
        }
    }

    /// スコアから label / confidence を決める
    pub fn from_scores(scores: ColumnScores, format_info: FormatInfo) -> Self {
        let (label, confidence) = scores.best();
        Self {
            label,
            confidence,
            scores,
            format_info,
        }
    }
}

/// 列の型検証結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnValidation {
    pub expected: TypeLabel,
    pub is_valid: bool,
    /// 一致率（%、小数2桁に丸め）
    pub match_percentage: f64,
    pub valid_count: usize,
    pub total_count: usize,
}

/// 複数列をまとめて検証した結果
///
/// 列名の順に並ぶ。存在しない列は `column_validations` に含まれない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// 合格したが一致率が 100% 未満の列
    pub warnings: Vec<String>,
    pub column_validations: BTreeMap<String, ColumnValidation>,
}

/// 保存層へ渡す正規化済みの列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum NormalizedColumn {
    Amounts(Vec<ParseOutcome<ParsedAmount>>),
    Dates(Vec<ParseOutcome<ParsedDate>>),
    Text(Vec<Option<String>>),
}

impl NormalizedColumn {
    pub fn len(&self) -> usize {
        match self {
            NormalizedColumn::Amounts(values) => values.len(),
            NormalizedColumn::Dates(values) => values.len(),
            NormalizedColumn::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 正規化に失敗したセル数（文字列列は常に0）
    pub fn error_count(&self) -> usize {
        match self {
            NormalizedColumn::Amounts(values) => values.iter().filter(|v| v.is_err()).count(),
            NormalizedColumn::Dates(values) => values.iter().filter(|v| v.is_err()).count(),
            NormalizedColumn::Text(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_decisive() {
        let scores = ColumnScores::decisive(TypeLabel::Number);
        assert_eq!(scores.number, 1.0);
        assert_eq!(scores.string, 0.0);
        assert_eq!(scores.best(), (TypeLabel::Number, 1.0));
    }

    #[test]
    fn test_scores_best_tie_prefers_string() {
        let scores = ColumnScores { string: 0.5, number: 0.5, date: 0.0 };
        assert_eq!(scores.best().0, TypeLabel::String);
    }

    #[test]
    fn test_type_label_from_str() {
        assert_eq!("Date".parse::<TypeLabel>(), Ok(TypeLabel::Date));
        assert_eq!("amount".parse::<TypeLabel>(), Ok(TypeLabel::Number));
        assert!("blob".parse::<TypeLabel>().is_err());
    }

    #[test]
    fn test_classification_unknown() {
        let result = ClassificationResult::unknown();
        assert_eq!(result.label, TypeLabel::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.format_info, FormatInfo::None);
    }

    #[test]
    fn test_classification_serialize() {
        let result = ClassificationResult::from_scores(
            ColumnScores::decisive(TypeLabel::Date),
            FormatInfo::Date(DateFormatInfo::default()),
        );

        let json = serde_json::to_string(&result).expect("シリアライズ失敗");
        assert!(json.contains("\"label\":\"date\""));
        assert!(json.contains("\"kind\":\"date\""));
        assert!(json.contains("\"confidence\":1.0"));
    }

    #[test]
    fn test_normalized_column_error_count() {
        let column = NormalizedColumn::Text(vec![Some("a".into()), None]);
        assert_eq!(column.len(), 2);
        assert_eq!(column.error_count(), 0);
    }
}
