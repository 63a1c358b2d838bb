//! 金額の正規化
//!
//! 規則を優先順に並べ、最初に適用できた規則の結果を返す:
//! 1. 桁略記（1.5M）
//! 2. 括弧の負数（(1,234.56)）
//! 3. 末尾マイナス（1234.56-）
//! 4. 標準（通貨記号・桁区切りを除去して解釈）

use super::FormatHint;
use crate::patterns::amount::{normalize_separators, parse_finite, strip_currency};
use cellsense_common::{Abbreviation, AmountFormatTag, ParseError, ParseOutcome, ParsedAmount};

/// 金額の解釈規則
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    Abbreviated,
    Parentheses,
    TrailingNegative,
    Standard,
}

impl AmountRule {
    /// 特殊書式の規則（宣言順）。どれも適用できなければ Standard
    pub const SPECIAL: [AmountRule; 3] = [
        AmountRule::Abbreviated,
        AmountRule::Parentheses,
        AmountRule::TrailingNegative,
    ];

    /// 規則が適用できる形か
    pub fn applies(&self, text: &str) -> bool {
        match self {
            AmountRule::Abbreviated => text
                .chars()
                .last()
                .and_then(Abbreviation::from_suffix)
                .is_some(),
            AmountRule::Parentheses => {
                text.len() >= 2 && text.starts_with('(') && text.ends_with(')')
            }
            AmountRule::TrailingNegative => text.ends_with('-'),
            AmountRule::Standard => true,
        }
    }

    /// 失敗した場合に後続の規則へ進むか
    fn falls_through(&self) -> bool {
        matches!(self, AmountRule::Abbreviated)
    }

    /// `text` はトリム済み、`original` はエラー報告用の入力そのもの
    fn apply(&self, text: &str, original: &str) -> ParseOutcome<ParsedAmount> {
        match self {
            AmountRule::Abbreviated => parse_abbreviated(text, original),
            AmountRule::Parentheses => parse_wrapped_negative(
                &text[1..text.len() - 1],
                original,
                AmountFormatTag::ParenthesesNegative,
            ),
            AmountRule::TrailingNegative => parse_wrapped_negative(
                &text[..text.len() - 1],
                original,
                AmountFormatTag::TrailingNegative,
            ),
            AmountRule::Standard => parse_standard(text, original),
        }
    }
}

/// 金額を正規化する
pub(crate) fn parse_amount(raw: Option<&str>, hint: &FormatHint) -> ParseOutcome<ParsedAmount> {
    let original = match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(ParseError::empty(raw)),
    };
    let text = original.trim();

    let mut deferred: Option<ParseError> = None;
    let mut parsed: Option<ParseOutcome<ParsedAmount>> = None;

    for rule in AmountRule::SPECIAL {
        if !rule.applies(text) {
            continue;
        }
        match rule.apply(text, original) {
            Ok(amount) => {
                tracing::trace!(rule = ?rule, value = text, "amount rule matched");
                parsed = Some(Ok(amount));
                break;
            }
            Err(err) if rule.falls_through() => deferred = Some(err),
            Err(err) => {
                parsed = Some(Err(err));
                break;
            }
        }
    }

    let outcome = match (parsed, deferred) {
        (Some(outcome), _) => outcome,
        (None, Some(err)) => Err(err),
        (None, None) => AmountRule::Standard.apply(text, original),
    };

    outcome.map(|amount| apply_hint(amount, hint))
}

fn apply_hint(mut amount: ParsedAmount, hint: &FormatHint) -> ParsedAmount {
    if amount.currency.is_none() {
        amount.currency = hint.currency;
    }
    amount
}

/// 1.5M → 1,500,000
fn parse_abbreviated(text: &str, original: &str) -> ParseOutcome<ParsedAmount> {
    let suffix = text
        .chars()
        .last()
        .and_then(Abbreviation::from_suffix)
        .ok_or_else(|| ParseError::invalid_numeric(original, text))?;
    let remainder = &text[..text.len() - 1];

    let (numeric, currency) = strip_currency(remainder);
    let base = parse_finite(&numeric)
        .ok_or_else(|| ParseError::invalid_numeric(original, &numeric))?;

    let value = base.abs() * suffix.multiplier();
    Ok(ParsedAmount::new(value, base < 0.0, AmountFormatTag::Abbreviated)
        .with_currency(currency)
        .with_abbreviation(suffix, base))
}

/// 括弧・末尾マイナスの中身を解釈（結果は常に負）
fn parse_wrapped_negative(
    inner: &str,
    original: &str,
    tag: AmountFormatTag,
) -> ParseOutcome<ParsedAmount> {
    let normalized = normalize_separators(inner.trim());
    let (numeric, currency) = strip_currency(&normalized);
    let value = parse_finite(&numeric)
        .ok_or_else(|| ParseError::invalid_numeric(original, &numeric))?;

    Ok(ParsedAmount::new(value, true, tag).with_currency(currency))
}

/// 通貨記号・桁区切りを除去して符号付きで解釈
fn parse_standard(text: &str, original: &str) -> ParseOutcome<ParsedAmount> {
    let normalized = normalize_separators(text);
    let (numeric, currency) = strip_currency(&normalized);
    let value = parse_finite(&numeric)
        .ok_or_else(|| ParseError::invalid_numeric(original, &numeric))?;

    Ok(ParsedAmount::new(value, value < 0.0, AmountFormatTag::Standard).with_currency(currency))
}
