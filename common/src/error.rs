//! エラー型定義
//!
//! 値単位の正規化失敗を表す。例外として投げず、常に戻り値として返す。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 正規化エラー
///
/// どの種別も元のテキストを保持する（`None` 入力の場合は空文字列）。
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    #[error("Empty value")]
    EmptyValue { original: String },

    #[error("Invalid numeric format: '{fragment}' in '{original}'")]
    InvalidNumericFormat { original: String, fragment: String },

    #[error("Unrecognized date format: {original} ({reason})")]
    UnrecognizedDateFormat { original: String, reason: String },
}

/// エラー種別（比較・集計用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    EmptyValue,
    InvalidNumericFormat,
    UnrecognizedDateFormat,
}

impl ParseError {
    pub fn empty(original: Option<&str>) -> Self {
        ParseError::EmptyValue {
            original: original.unwrap_or_default().to_string(),
        }
    }

    pub fn invalid_numeric(original: &str, fragment: &str) -> Self {
        ParseError::InvalidNumericFormat {
            original: original.to_string(),
            fragment: fragment.to_string(),
        }
    }

    pub fn unrecognized_date(original: &str, reason: impl Into<String>) -> Self {
        ParseError::UnrecognizedDateFormat {
            original: original.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::EmptyValue { .. } => ParseErrorKind::EmptyValue,
            ParseError::InvalidNumericFormat { .. } => ParseErrorKind::InvalidNumericFormat,
            ParseError::UnrecognizedDateFormat { .. } => ParseErrorKind::UnrecognizedDateFormat,
        }
    }

    /// 入力された元のテキスト
    pub fn original_text(&self) -> &str {
        match self {
            ParseError::EmptyValue { original }
            | ParseError::InvalidNumericFormat { original, .. }
            | ParseError::UnrecognizedDateFormat { original, .. } => original,
        }
    }

    /// 人が読むための理由文
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// 正規化結果（成功値か構造化エラーのどちらか）
pub type ParseOutcome<T> = std::result::Result<T, ParseError>;
