//! 金額の書式パターン
//!
//! 書式の判別と、桁区切り・小数点の正規化を行う。

use cellsense_common::Currency;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 金額の書式
///
/// 互いに排他ではない（`$1,234` は us_currency でもあり得る）。
/// 判別は宣言順で先に一致したものを返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountPattern {
    /// $1,234.56
    UsCurrency,
    /// €1.234,56
    EuropeanCurrency,
    /// ₹1,23,456.78
    IndianCurrency,
    /// (1,234.56)
    NegativeParentheses,
    /// 1234.56-
    TrailingNegative,
    /// 1.5M
    Abbreviated,
    /// 1,234.56
    PlainNumber,
}

impl AmountPattern {
    pub const ALL: [AmountPattern; 7] = [
        AmountPattern::UsCurrency,
        AmountPattern::EuropeanCurrency,
        AmountPattern::IndianCurrency,
        AmountPattern::NegativeParentheses,
        AmountPattern::TrailingNegative,
        AmountPattern::Abbreviated,
        AmountPattern::PlainNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AmountPattern::UsCurrency => "us_currency",
            AmountPattern::EuropeanCurrency => "european_currency",
            AmountPattern::IndianCurrency => "indian_currency",
            AmountPattern::NegativeParentheses => "negative_parentheses",
            AmountPattern::TrailingNegative => "trailing_negative",
            AmountPattern::Abbreviated => "abbreviated",
            AmountPattern::PlainNumber => "plain_number",
        }
    }

    pub(crate) fn regex_source(&self) -> &'static str {
        match self {
            AmountPattern::UsCurrency => r"^\$[\d,]+\.?\d*$",
            AmountPattern::EuropeanCurrency => r"^€[\d.,]+$",
            AmountPattern::IndianCurrency => r"^₹[\d,]+\.?\d*$",
            AmountPattern::NegativeParentheses => r"^\([\d,]+\.?\d*\)$",
            AmountPattern::TrailingNegative => r"^[\d,]+\.?\d*-$",
            AmountPattern::Abbreviated => r"(?i)^[\d.]+[KMBT]$",
            AmountPattern::PlainNumber => r"^[\d,]+\.?\d*$",
        }
    }
}

impl fmt::Display for AmountPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 桁区切りの流儀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorStyle {
    /// `.` が桁区切り、`,` が小数点
    European,
    /// `,` が桁区切り（3桁区切り、またはインド式の2桁/3桁区切り）
    CommaGrouped,
    /// 桁区切りなし
    Plain,
}

lazy_static::lazy_static! {
    // 数字とドットの連なり
    static ref DOT_RUN_RE: Regex = Regex::new(r"[\d.]*\d").unwrap();
    // ドットの後ろが常にちょうど3桁
    static ref DOT_GROUPED_RE: Regex = Regex::new(r"^\d+(?:\.\d{3})+$").unwrap();
    // 数字とカンマの連なり
    static ref COMMA_RUN_RE: Regex = Regex::new(r"\d[\d,]*\d").unwrap();
    // 末尾が3桁、途中は2桁か3桁（1,234,567 / 1,23,456）
    static ref COMMA_GROUPED_RE: Regex = Regex::new(r"^\d+(?:,\d{2,3})*,\d{3}$").unwrap();
}

/// 桁区切りの流儀を判定
///
/// `.` の直後がちょうど3桁なら、その `.` は小数点ではなく欧州式の桁区切りとみなす。
pub fn detect_separators(text: &str) -> SeparatorStyle {
    if DOT_RUN_RE
        .find_iter(text)
        .any(|m| DOT_GROUPED_RE.is_match(m.as_str()))
    {
        return SeparatorStyle::European;
    }

    if COMMA_RUN_RE
        .find_iter(text)
        .any(|m| COMMA_GROUPED_RE.is_match(m.as_str()))
    {
        return SeparatorStyle::CommaGrouped;
    }

    SeparatorStyle::Plain
}

/// 桁区切りを取り除き、小数点を `.` に揃える
///
/// 通貨記号や符号には触れない。
pub fn normalize_separators(text: &str) -> String {
    match detect_separators(text) {
        SeparatorStyle::European => {
            let collapsed = DOT_RUN_RE.replace_all(text, |caps: &Captures| {
                let run = &caps[0];
                if DOT_GROUPED_RE.is_match(run) {
                    run.replace('.', "")
                } else {
                    run.to_string()
                }
            });
            collapsed.replace(',', ".")
        }
        SeparatorStyle::CommaGrouped => COMMA_RUN_RE
            .replace_all(text, |caps: &Captures| {
                let run = &caps[0];
                if COMMA_GROUPED_RE.is_match(run) {
                    run.replace(',', "")
                } else {
                    run.to_string()
                }
            })
            .into_owned(),
        SeparatorStyle::Plain => text.to_string(),
    }
}

/// 通貨記号を取り除く
///
/// 最初に現れた記号の通貨を返す。記号とその前後の空白だけを除去する（`- $ 12` → `-12`）。
/// 数字の間の空白は残るので `1 234` は数値にならない。
pub fn strip_currency(text: &str) -> (String, Option<Currency>) {
    let currency = text.chars().find_map(Currency::from_symbol);
    let mut stripped = String::with_capacity(text.len());
    let mut after_symbol = false;
    for c in text.chars() {
        if Currency::from_symbol(c).is_some() {
            stripped.truncate(stripped.trim_end().len());
            after_symbol = true;
        } else if after_symbol && c.is_whitespace() {
            continue;
        } else {
            after_symbol = false;
            stripped.push(c);
        }
    }
    (stripped, currency)
}

/// 先頭の通貨記号（最初の1つ）
pub fn find_currency_symbol(text: &str) -> Option<char> {
    text.chars().find(|c| Currency::from_symbol(*c).is_some())
}

/// 有限の浮動小数点数として解釈
pub fn parse_finite(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_separators() {
        assert_eq!(detect_separators("1.234,56"), SeparatorStyle::European);
        assert_eq!(detect_separators("€1.234.567"), SeparatorStyle::European);
        assert_eq!(detect_separators("$1,234.56"), SeparatorStyle::CommaGrouped);
        assert_eq!(detect_separators("1,23,456.78"), SeparatorStyle::CommaGrouped);
        assert_eq!(detect_separators("1234.56"), SeparatorStyle::Plain);
        assert_eq!(detect_separators("12.5"), SeparatorStyle::Plain);
    }

    #[test]
    fn test_normalize_separators_european() {
        assert_eq!(normalize_separators("1.234,56"), "1234.56");
        assert_eq!(normalize_separators("1.234.567,89"), "1234567.89");
        assert_eq!(normalize_separators("€1.234"), "€1234");
    }

    #[test]
    fn test_normalize_separators_comma() {
        assert_eq!(normalize_separators("$1,234.56"), "$1234.56");
        assert_eq!(normalize_separators("1,234,567"), "1234567");
        assert_eq!(normalize_separators("₹1,23,456.78"), "₹123456.78");
        // 桁区切りとして不正なカンマは残す
        assert_eq!(normalize_separators("1,5"), "1,5");
    }

    #[test]
    fn test_strip_currency() {
        assert_eq!(strip_currency("$1234.56"), ("1234.56".to_string(), Some(Currency::Usd)));
        assert_eq!(strip_currency("-£ 12"), ("-12".to_string(), Some(Currency::Gbp)));
        assert_eq!(strip_currency("99"), ("99".to_string(), None));
        assert_eq!(strip_currency("12 €"), ("12".to_string(), Some(Currency::Eur)));
        // 記号から離れた空白は残す
        assert_eq!(strip_currency("1 234"), ("1 234".to_string(), None));
    }

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite(" 12.5 "), Some(12.5));
        assert_eq!(parse_finite("-3"), Some(-3.0));
        assert_eq!(parse_finite("nan"), None);
        assert_eq!(parse_finite("inf"), None);
        assert_eq!(parse_finite(""), None);
        assert_eq!(parse_finite("1,5"), None);
    }
}
