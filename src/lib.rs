//! cellsense - 表計算の列データの型判定と正規化
//!
//! ## 構成
//! - patterns: 金額・日付の書式パターン（プロセス共有）
//! - classifier: 列の型判定（文字列・数値・日付）
//! - normalizer: 金額・日付の正規化、列の検証
//! - config / logging / error / cli: アプリケーション層

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalizer;
pub mod patterns;

pub use classifier::{classify_column, classify_columns, ClassifierOptions, ColumnClassifier};
pub use normalizer::{
    parse_amount, parse_date, DateOrder, FormatHint, Normalizer, NormalizerOptions,
};
pub use patterns::PatternLibrary;
