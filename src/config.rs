use crate::classifier::ClassifierOptions;
use crate::error::{CellsenseError, Result};
use crate::normalizer::validation::DEFAULT_VALIDATION_THRESHOLD;
use crate::normalizer::{DateOrder, NormalizerOptions};
use cellsense_common::Currency;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 数字だけの日付の読み方
    pub date_order: DateOrder,
    /// 未知の月名を1月として扱う
    pub lenient_month_names: bool,
    /// 空白のみのセルを null として扱う
    pub blank_as_null: bool,
    /// 型判定に使う値の上限
    pub sample_limit: Option<usize>,
    /// 列検証の合格ライン（%）
    pub validation_threshold: f64,
    /// 通貨記号がない金額の通貨
    pub default_currency: Option<Currency>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定ファイルから読み込む（なければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CellsenseError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("cellsense").join("config.json"))
    }

    pub fn default_config() -> Self {
        Self {
            date_order: DateOrder::MonthFirst,
            lenient_month_names: true,
            blank_as_null: true,
            sample_limit: None,
            validation_threshold: DEFAULT_VALIDATION_THRESHOLD,
            default_currency: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.validation_threshold) {
            return Err(CellsenseError::Config(format!(
                "validation_threshold は 0〜100 の範囲で指定してください: {}",
                self.validation_threshold
            )));
        }
        if self.sample_limit == Some(0) {
            return Err(CellsenseError::Config(
                "sample_limit は 1 以上を指定してください".into(),
            ));
        }
        Ok(())
    }

    /// `key=value` 形式で1項目を変更
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key.trim() {
            "date_order" => {
                self.date_order = value.parse().map_err(CellsenseError::Config)?;
            }
            "lenient_month_names" => self.lenient_month_names = parse_bool(key, value)?,
            "blank_as_null" => self.blank_as_null = parse_bool(key, value)?,
            "sample_limit" => {
                self.sample_limit = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        CellsenseError::Config(format!("sample_limit が数値ではありません: {}", value))
                    })?)
                };
            }
            "validation_threshold" => {
                self.validation_threshold = value.parse().map_err(|_| {
                    CellsenseError::Config(format!(
                        "validation_threshold が数値ではありません: {}",
                        value
                    ))
                })?;
            }
            "default_currency" => {
                self.default_currency = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(Currency::from_code(value).ok_or_else(|| {
                        CellsenseError::Config(format!("未対応の通貨コード: {}", value))
                    })?)
                };
            }
            other => {
                return Err(CellsenseError::Config(format!("不明な設定項目: {}", other)));
            }
        }
        self.validate()
    }

    pub fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            date_order: self.date_order,
            lenient_month_names: self.lenient_month_names,
            default_currency: self.default_currency,
        }
    }

    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            blank_as_null: self.blank_as_null,
            sample_limit: self.sample_limit,
            lenient_month_names: self.lenient_month_names,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CellsenseError::Config(format!(
            "{} には true/false を指定してください: {}",
            key, value
        ))),
    }
}
