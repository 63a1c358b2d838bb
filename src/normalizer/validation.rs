//! 列の型検証
//!
//! 列の値がどの程度期待する型として解釈できるかを割合で返す。
//! 列名と型の対応表で複数列をまとめて検証することもできる。

use super::Normalizer;
use cellsense_common::{ColumnValidation, SchemaValidation, TypeLabel};
use std::collections::BTreeMap;

/// 既定のしきい値（%）
pub const DEFAULT_VALIDATION_THRESHOLD: f64 = 80.0;

impl Normalizer {
    /// 列が `expected` 型として妥当か検証する
    ///
    /// null と空白のセルは数えない。文字列型は常に一致、Unknown は常に不一致。
    /// 値が1つもなければ 0% で不合格。
    pub fn validate_column(
        &self,
        values: &[Option<String>],
        expected: TypeLabel,
        threshold: f64,
    ) -> ColumnValidation {
        let present: Vec<&str> = values
            .iter()
            .filter_map(|v| v.as_deref())
            .filter(|v| !v.trim().is_empty())
            .collect();
        let total_count = present.len();

        let valid_count = match expected {
            TypeLabel::String => total_count,
            TypeLabel::Number => present
                .iter()
                .filter(|&&v| self.parse_amount(Some(v)).is_ok())
                .count(),
            TypeLabel::Date => present
                .iter()
                .filter(|&&v| self.parse_date(Some(v)).is_ok())
                .count(),
            TypeLabel::Unknown => 0,
        };

        let match_percentage = if total_count == 0 {
            0.0
        } else {
            round2(valid_count as f64 / total_count as f64 * 100.0)
        };
        let is_valid =
            total_count > 0 && expected != TypeLabel::Unknown && match_percentage >= threshold;

        tracing::debug!(
            expected = %expected,
            valid_count,
            total_count,
            match_percentage,
            "column validated"
        );

        ColumnValidation {
            expected,
            is_valid,
            match_percentage,
            valid_count,
            total_count,
        }
    }

    /// 列名 → 期待する型 の対応表で複数列を検証する
    ///
    /// 存在しない列と不合格の列は `errors`、合格でも 100% 未満の列は `warnings` に入る。
    pub fn validate_schema(
        &self,
        columns: &BTreeMap<String, Vec<Option<String>>>,
        schema: &BTreeMap<String, TypeLabel>,
        threshold: f64,
    ) -> SchemaValidation {
        let mut result = SchemaValidation {
            is_valid: true,
            ..Default::default()
        };

        let missing: Vec<&str> = schema
            .keys()
            .filter(|name| !columns.contains_key(*name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            result
                .errors
                .push(format!("Missing columns: [{}]", missing.join(", ")));
            result.is_valid = false;
        }

        for (name, &expected) in schema {
            let values = match columns.get(name) {
                Some(values) => values,
                None => continue,
            };
            let validation = self.validate_column(values, expected, threshold);

            if !validation.is_valid {
                result.errors.push(format!(
                    "Column \"{}\": type mismatch ({}% match with {})",
                    name, validation.match_percentage, expected
                ));
                result.is_valid = false;
            } else if validation.match_percentage < 100.0 {
                result.warnings.push(format!(
                    "Column \"{}\": {}% match with {}",
                    name, validation.match_percentage, expected
                ));
            }
            result.column_validations.insert(name.clone(), validation);
        }

        tracing::debug!(
            columns = schema.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "schema validated"
        );
        result
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_validate_number_column() {
        let values = column(&["$1,200", "(50)", "n/a", "3.5K", "12"]);
        let result = Normalizer::default().validate_column(&values, TypeLabel::Number, 80.0);
        assert_eq!(result.valid_count, 4);
        assert_eq!(result.total_count, 5);
        assert_eq!(result.match_percentage, 80.0);
        assert!(result.is_valid);
    }

    #[test]
    fn test_validate_rounds_percentage() {
        let values = column(&["2024-01-01", "2024-02-01", "nope"]);
        let result = Normalizer::default().validate_column(&values, TypeLabel::Date, 80.0);
        assert_eq!(result.match_percentage, 66.67);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_validate_string_always_matches() {
        let mut values = column(&["anything", "12"]);
        values.push(None);
        let result = Normalizer::default().validate_column(&values, TypeLabel::String, 100.0);
        assert_eq!(result.total_count, 2);
        assert!(result.is_valid);
    }

    #[test]
    fn test_validate_empty_and_unknown() {
        let normalizer = Normalizer::default();
        let blank = [None, Some(" ".to_string())];
        let result = normalizer.validate_column(&blank, TypeLabel::String, 0.0);
        assert!(!result.is_valid);
        assert_eq!(result.match_percentage, 0.0);

        let result = normalizer.validate_column(&column(&["x"]), TypeLabel::Unknown, 0.0);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_validate_schema() {
        let mut columns = BTreeMap::new();
        columns.insert("amount".to_string(), column(&["$10", "(5)", "n/a", "3.5K", "12"]));
        columns.insert("posted".to_string(), column(&["2024-01-01", "nope", "x"]));
        columns.insert("memo".to_string(), column(&["rent", "fees"]));

        let mut schema = BTreeMap::new();
        schema.insert("amount".to_string(), TypeLabel::Number);
        schema.insert("posted".to_string(), TypeLabel::Date);
        schema.insert("memo".to_string(), TypeLabel::String);
        schema.insert("vendor".to_string(), TypeLabel::String);

        let result = Normalizer::default().validate_schema(
            &columns,
            &schema,
            DEFAULT_VALIDATION_THRESHOLD,
        );
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0], "Missing columns: [vendor]");
        assert!(result.errors[1].starts_with("Column \"posted\""));
        assert_eq!(result.warnings, vec!["Column \"amount\": 80% match with number"]);

        assert_eq!(result.column_validations.len(), 3);
        assert!(result.column_validations["memo"].is_valid);
        assert!(!result.column_validations.contains_key("vendor"));
    }

    #[test]
    fn test_validate_schema_all_pass() {
        let mut columns = BTreeMap::new();
        columns.insert("amount".to_string(), column(&["1", "2"]));
        let mut schema = BTreeMap::new();
        schema.insert("amount".to_string(), TypeLabel::Number);

        let result = Normalizer::default().validate_schema(&columns, &schema, 80.0);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }
}
