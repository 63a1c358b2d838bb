//! 判定した型ごとの書式メタデータ
//!
//! 判定結果には影響しない。下流で書式を再現するための記述情報。

use super::ColumnClassifier;
use crate::patterns::amount::{
    detect_separators, find_currency_symbol, parse_finite, SeparatorStyle,
};
use crate::patterns::{AmountPattern, SERIAL_PARSE_RANGE};
use cellsense_common::{DateFormatInfo, DateFormatTag, NumberFormatInfo, StringFormatInfo};
use regex::Regex;

/// シリアル値のサンプル数
const SERIAL_SAMPLE_LIMIT: usize = 5;

/// キーワード分類のサンプル数
const KEYWORD_SAMPLE_LIMIT: usize = 3;

lazy_static::lazy_static! {
    static ref ACCOUNT_RE: Regex = Regex::new(r"(?i)\b(accounts?|ledgers?|gl)\b").unwrap();
    static ref TRANSACTION_RE: Regex =
        Regex::new(r"(?i)\b(transactions?|ref|invoices?|payments?)\b").unwrap();
    static ref COMPANY_RE: Regex = Regex::new(r"(?i)\b(inc|corp|ltd|company)\b").unwrap();
    static ref PARENTHESES_RE: Regex = Regex::new(r"\(.*\)").unwrap();
}

impl ColumnClassifier {
    /// 日付列: 検出した書式、シリアル値の有無と件数
    pub(crate) fn date_format_info(&self, values: &[&str]) -> DateFormatInfo {
        let mut info = DateFormatInfo::default();

        for value in values {
            let value = value.trim();

            if let Some(serial) = parse_finite(value).filter(|v| SERIAL_PARSE_RANGE.contains(v)) {
                info.excel_serial_dates = true;
                info.excel_date_count += 1;
                if info.sample_excel_dates.len() < SERIAL_SAMPLE_LIMIT {
                    info.sample_excel_dates.push(serial);
                }
                info.detected_patterns
                    .insert(DateFormatTag::ExcelSerial.as_str().to_string());
                continue;
            }

            let tag = match self.patterns.match_date_grammar(value) {
                Some(pattern) => pattern.as_str(),
                None => DateFormatTag::FreeForm.as_str(),
            };
            info.detected_patterns.insert(tag.to_string());
        }

        info
    }

    /// 数値列: 通貨記号、小数点・桁区切り、負数表記、桁略記
    pub(crate) fn number_format_info(&self, values: &[&str]) -> NumberFormatInfo {
        let mut info = NumberFormatInfo::default();

        for value in values {
            let value = value.trim();

            if let Some(symbol) = find_currency_symbol(value) {
                info.currency_symbols.insert(symbol);
            }

            match detect_separators(value) {
                SeparatorStyle::European => {
                    info.decimal_separators.insert(',');
                    info.thousand_separators.insert('.');
                }
                SeparatorStyle::CommaGrouped => {
                    info.thousand_separators.insert(',');
                    if value.contains('.') {
                        info.decimal_separators.insert('.');
                    }
                }
                SeparatorStyle::Plain => {
                    if value.contains('.') {
                        info.decimal_separators.insert('.');
                    }
                }
            }

            if PARENTHESES_RE.is_match(value) || value.ends_with('-') {
                info.negative_formats.insert(value.to_string());
            }

            if self.patterns.is_amount_pattern(AmountPattern::Abbreviated, value) {
                info.abbreviated_formats = true;
            }
        }

        info
    }

    /// 文字列列: 勘定科目・取引・会社名らしい値の件数
    pub(crate) fn string_format_info(&self, values: &[&str]) -> StringFormatInfo {
        let mut info = StringFormatInfo::default();

        for value in values {
            if ACCOUNT_RE.is_match(value) {
                info.account_related += 1;
                push_sample(&mut info.sample_accounts, value);
            }
            if TRANSACTION_RE.is_match(value) {
                info.transaction_related += 1;
                push_sample(&mut info.sample_transactions, value);
            }
            if COMPANY_RE.is_match(value) {
                info.company_related += 1;
                push_sample(&mut info.sample_companies, value);
            }
        }

        info
    }
}

fn push_sample(samples: &mut Vec<String>, value: &str) {
    if samples.len() < KEYWORD_SAMPLE_LIMIT {
        samples.push(value.to_string());
    }
}
