use anyhow::{Context, Result};
use cellsense::classifier::{classify_columns, ColumnClassifier};
use cellsense::error::CellsenseError;
use cellsense::normalizer::{FormatHint, Normalizer};
use cellsense::patterns::PatternLibrary;
use cellsense::{cli, config, logging};
use cellsense_common::{
    ClassificationResult, ColumnScores, Currency, FormatInfo, ParseError, ParseOutcome, TypeLabel,
};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{BufRead, IsTerminal};
use std::path::Path;

/// 1セル分の正規化結果
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CellReport<'a, T> {
    input: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ParseError>,
}

impl<'a, T> CellReport<'a, T> {
    fn new(
        input: Option<&'a str>,
        outcome: ParseOutcome<T>,
        canonical: impl Fn(&T) -> String,
    ) -> Self {
        match outcome {
            Ok(value) => Self {
                input,
                canonical: Some(canonical(&value)),
                value: Some(value),
                error: None,
            },
            Err(err) => Self {
                input,
                canonical: None,
                value: None,
                error: Some(err),
            },
        }
    }
}

/// 1値分の書式パターン一致結果
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatternReport<'a> {
    input: &'a str,
    amount_pattern: Option<&'static str>,
    amount_patterns: Vec<&'static str>,
    date_pattern: Option<&'static str>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Classify {
            values,
            columns,
            sample_limit,
        } => {
            if sample_limit.is_some() {
                config.sample_limit = sample_limit;
            }
            let classifier = ColumnClassifier::new(config.classifier_options());

            match columns {
                Some(path) => {
                    let columns: Vec<Vec<Option<String>>> = read_json(&path)?;
                    let results = classify_columns(&classifier, &columns);
                    print_json(&results)?;
                }
                None => {
                    let column = read_values(values)?;
                    print_json(&classifier.classify(&column))?;
                }
            }
        }

        Commands::Amount { values, currency } => {
            let currency = match currency {
                Some(code) => Some(
                    Currency::from_code(&code)
                        .with_context(|| format!("未対応の通貨コード: {}", code))?,
                ),
                None => None,
            };
            let hint = FormatHint {
                currency,
                ..Default::default()
            };
            let normalizer = Normalizer::new(config.normalizer_options());

            let column = read_values(values)?;
            let reports: Vec<_> = column
                .iter()
                .map(|v| {
                    let outcome = normalizer.parse_amount_with_hint(v.as_deref(), &hint);
                    CellReport::new(v.as_deref(), outcome, |a| a.canonical())
                })
                .collect();
            print_json(&reports)?;
        }

        Commands::Date { values, date_order } => {
            let hint = FormatHint {
                date_order,
                ..Default::default()
            };
            let normalizer = Normalizer::new(config.normalizer_options());

            let column = read_values(values)?;
            let reports: Vec<_> = column
                .iter()
                .map(|v| {
                    let outcome = normalizer.parse_date_with_hint(v.as_deref(), &hint);
                    CellReport::new(v.as_deref(), outcome, |d| d.canonical())
                })
                .collect();
            print_json(&reports)?;
        }

        Commands::Normalize { values, as_type } => {
            let column = read_values(values)?;
            let classification = match as_type {
                Some(TypeLabel::Unknown) => {
                    return Err(CellsenseError::Input("unknown は指定できません".into()).into())
                }
                Some(label) => ClassificationResult::from_scores(
                    ColumnScores::decisive(label),
                    FormatInfo::None,
                ),
                None => ColumnClassifier::new(config.classifier_options()).classify(&column),
            };

            let normalizer = Normalizer::new(config.normalizer_options());
            let normalized = normalizer.normalize_column(&column, &classification);
            if normalized.error_count() > 0 {
                tracing::warn!(
                    errors = normalized.error_count(),
                    cells = normalized.len(),
                    "some cells could not be normalized"
                );
            }

            print_json(&serde_json::json!({
                "classification": classification,
                "column": normalized,
            }))?;
        }

        Commands::Validate {
            expected,
            threshold,
            values,
        } => {
            let column = read_values(values)?;
            let threshold = threshold.unwrap_or(config.validation_threshold);
            let normalizer = Normalizer::new(config.normalizer_options());
            print_json(&normalizer.validate_column(&column, expected, threshold))?;
        }

        Commands::Schema {
            columns,
            schema,
            threshold,
        } => {
            let columns: BTreeMap<String, Vec<Option<String>>> = read_json(&columns)?;
            let schema: BTreeMap<String, TypeLabel> = read_json(&schema)?;
            let threshold = threshold.unwrap_or(config.validation_threshold);
            let normalizer = Normalizer::new(config.normalizer_options());
            print_json(&normalizer.validate_schema(&columns, &schema, threshold))?;
        }

        Commands::Patterns { values } => {
            let library = PatternLibrary::global();
            let column = read_values(values)?;
            let reports: Vec<_> = column
                .iter()
                .flatten()
                .map(|v| PatternReport {
                    input: v.as_str(),
                    amount_pattern: library.match_amount_pattern(v).map(|p| p.as_str()),
                    amount_patterns: library
                        .amount_patterns(v)
                        .iter()
                        .map(|p| p.as_str())
                        .collect(),
                    date_pattern: library.match_date_pattern(v).map(|p| p.as_str()),
                })
                .collect();
            print_json(&reports)?;
        }

        Commands::Config { set, show, path } => {
            if path {
                let config_path = match &cli.config {
                    Some(p) => p.clone(),
                    None => Config::config_path()?,
                };
                println!("{}", config_path.display());
            }

            if !set.is_empty() {
                for entry in &set {
                    let (key, value) = entry
                        .split_once('=')
                        .with_context(|| format!("key=value の形式で指定してください: {}", entry))?;
                    config.set(key, value)?;
                }
                match &cli.config {
                    Some(p) => config.save_to(p)?,
                    None => config.save()?,
                }
                eprintln!("設定を保存しました");
            }

            if show || (set.is_empty() && !path) {
                print_json(&config)?;
            }
        }
    }

    Ok(())
}

/// 引数があればそれを、なければ標準入力を1行1セルで読む（空行は null）
fn read_values(values: Vec<String>) -> Result<Vec<Option<String>>> {
    if !values.is_empty() {
        return Ok(values.into_iter().map(Some).collect());
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(CellsenseError::Input("値を引数か標準入力で指定してください".into()).into());
    }

    stdin
        .lock()
        .lines()
        .map(|line| {
            let line = line.context("標準入力の読み込みに失敗しました")?;
            Ok(if line.is_empty() { None } else { Some(line) })
        })
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("ファイルを読み込めません: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("JSON が不正です: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
