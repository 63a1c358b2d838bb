//! cellsense Common Library
//!
//! 判定エンジンと下流の保存層で共有される値型とエラー型

pub mod error;
pub mod types;
pub mod value;

pub use error::{ParseError, ParseErrorKind, ParseOutcome};
pub use types::{
    ClassificationResult, ColumnScores, ColumnValidation, DateFormatInfo, FormatInfo,
    NormalizedColumn, NumberFormatInfo, SchemaValidation, StringFormatInfo, TypeLabel,
};
pub use value::{
    Abbreviation, AmountFormatTag, Currency, DateFormatTag, ParsedAmount, ParsedDate,
};
