//! 列の型判定テスト
//!
//! 判定結果、書式メタデータ、正規化への受け渡しを検証

use cellsense::classifier::{classify_columns, ClassifierOptions, ColumnClassifier};
use cellsense::normalizer::Normalizer;
use cellsense::classify_column;
use cellsense_common::{ColumnScores, FormatInfo, NormalizedColumn, TypeLabel};

fn column(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

/// ISO 日付の列
#[test]
fn test_iso_dates() {
    let result = classify_column(&column(&["2023-01-01", "2023-01-02", "2023-01-03"]));
    assert_eq!(result.label, TypeLabel::Date);
    assert_eq!(result.confidence, 1.0);

    match result.format_info {
        FormatInfo::Date(info) => {
            assert!(info.detected_patterns.contains("yyyy_mm_dd"));
            assert!(!info.excel_serial_dates);
        }
        other => panic!("unexpected format info: {:?}", other),
    }
}

/// 文字列と数値が半々なら文字列
#[test]
fn test_mixed_defaults_to_string() {
    let result = classify_column(&column(&["text", "123", "more text", "456"]));
    assert_eq!(result.label, TypeLabel::String);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.scores, ColumnScores::decisive(TypeLabel::String));
}

/// 金額の列と書式情報
#[test]
fn test_amount_column() {
    let result = classify_column(&column(&["$1,200.00", "($350.25)", "$80", "1.2K", "$15.50-"]));
    assert_eq!(result.label, TypeLabel::Number);

    match result.format_info {
        FormatInfo::Number(info) => {
            assert!(info.currency_symbols.contains(&'$'));
            assert!(info.thousand_separators.contains(&','));
            assert!(info.abbreviated_formats);
            assert_eq!(info.negative_formats.len(), 2);
        }
        other => panic!("unexpected format info: {:?}", other),
    }
}

/// 日付らしい値は数値として数えない
#[test]
fn test_dates_not_double_counted() {
    // シリアル値らしい整数は日付側に数える
    let result = classify_column(&column(&["45000", "45001", "7"]));
    assert_eq!(result.label, TypeLabel::Date);

    match result.format_info {
        FormatInfo::Date(info) => {
            assert_eq!(info.excel_date_count, 2);
            assert_eq!(info.sample_excel_dates, vec![45000.0, 45001.0]);
        }
        other => panic!("unexpected format info: {:?}", other),
    }
}

/// 文字列列のキーワード分類
#[test]
fn test_string_keywords() {
    let result = classify_column(&column(&["Payment ref 881", "Acme Ltd", "Ledger A", "misc"]));
    assert_eq!(result.label, TypeLabel::String);

    match result.format_info {
        FormatInfo::String(info) => {
            assert_eq!(info.transaction_related, 1);
            assert_eq!(info.company_related, 1);
            assert_eq!(info.account_related, 1);
        }
        other => panic!("unexpected format info: {:?}", other),
    }
}

/// null だけの列は Unknown
#[test]
fn test_all_null_is_unknown() {
    let values: Vec<Option<String>> = vec![None, None];
    let result = classify_column(&values);
    assert_eq!(result.label, TypeLabel::Unknown);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.format_info, FormatInfo::None);
}

/// 信頼度は常に 0 か 1 で、ラベルは最大スコアの型
#[test]
fn test_classification_determinism() {
    let samples = vec![
        column(&["1", "2", "3"]),
        column(&["a", "b", "1"]),
        column(&["2024-01-01", "x"]),
        column(&["Q1 2024", "Q2 2024", "Q3 2024"]),
        column(&[]),
        column(&["(5)", "2024-01-01", "abc", "1M"]),
    ];
    for sample in &samples {
        let first = classify_column(sample);
        let second = classify_column(sample);
        assert_eq!(first, second);
        assert!(first.confidence == 0.0 || first.confidence == 1.0);
        if first.label != TypeLabel::Unknown {
            assert_eq!(first.scores.best().0, first.label);
        }
    }
}

/// 複数列の並列判定
#[test]
fn test_classify_columns() {
    let columns = vec![
        column(&["2024-01-01", "2024-02-01"]),
        column(&["$5", "$6"]),
        column(&["alpha", "beta"]),
    ];
    let classifier = ColumnClassifier::new(ClassifierOptions::default());
    let labels: Vec<TypeLabel> = classify_columns(&classifier, &columns)
        .into_iter()
        .map(|r| r.label)
        .collect();
    assert_eq!(labels, vec![TypeLabel::Date, TypeLabel::Number, TypeLabel::String]);
}

/// 判定結果に従って列を正規化
#[test]
fn test_classify_then_normalize() {
    let mut values = column(&["Q1 2024", "Q2 2024", "March 2024"]);
    values.push(None);

    let classification = classify_column(&values);
    assert_eq!(classification.label, TypeLabel::Date);

    let normalized = Normalizer::default().normalize_column(&values, &classification);
    assert_eq!(normalized.len(), 4);
    assert_eq!(normalized.error_count(), 1);
    match normalized {
        NormalizedColumn::Dates(dates) => {
            assert_eq!(dates[0].as_ref().unwrap().canonical(), "2024-01-01");
            assert_eq!(dates[2].as_ref().unwrap().canonical(), "2024-03-01");
        }
        other => panic!("unexpected column: {:?}", other),
    }
}

/// 判定結果を JSON にしても型名は snake_case
#[test]
fn test_result_json() {
    let result = classify_column(&column(&["1", "2"]));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["label"], "number");
    assert_eq!(json["formatInfo"]["kind"], "number");
}
