use crate::normalizer::DateOrder;
use cellsense_common::TypeLabel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cellsense")]
#[command(about = "表計算の列データの型判定・金額/日付の正規化ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（省略時: ~/.config/cellsense/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 列の型を判定
    Classify {
        /// 列の値（省略時は標準入力から1行1セル、空行は null）
        values: Vec<String>,

        /// 複数列を JSON ファイル（文字列または null の配列の配列）から読む
        #[arg(long, conflicts_with = "values")]
        columns: Option<PathBuf>,

        /// 判定に使う値の上限
        #[arg(long)]
        sample_limit: Option<usize>,
    },

    /// 金額を正規化
    Amount {
        /// 金額の文字列（省略時は標準入力）
        values: Vec<String>,

        /// 通貨記号がない場合の通貨コード（USD/EUR/INR/GBP/JPY）
        #[arg(long)]
        currency: Option<String>,
    },

    /// 日付を正規化
    Date {
        /// 日付の文字列（省略時は標準入力）
        values: Vec<String>,

        /// 数字だけの日付の読み方 (month-first/day-first)
        #[arg(long)]
        date_order: Option<DateOrder>,
    },

    /// 列の型を判定してから全セルを正規化
    Normalize {
        /// 列の値（省略時は標準入力）
        values: Vec<String>,

        /// 判定を省略して型を指定 (string/number/date)
        #[arg(short = 't', long = "type")]
        as_type: Option<TypeLabel>,
    },

    /// 列が期待する型に合っているか検証
    Validate {
        /// 期待する型 (string/number/date)
        #[arg(short, long, required = true)]
        expected: TypeLabel,

        /// 合格ライン（%、省略時は設定値）
        #[arg(long)]
        threshold: Option<f64>,

        /// 列の値（省略時は標準入力）
        values: Vec<String>,
    },

    /// 名前付きの列を、列名 → 型 の対応表でまとめて検証
    Schema {
        /// 列データの JSON ファイル（列名 → 文字列または null の配列）
        #[arg(long, required = true)]
        columns: PathBuf,

        /// 対応表の JSON ファイル（列名 → string/number/date）
        #[arg(long, required = true)]
        schema: PathBuf,

        /// 合格ライン（%、省略時は設定値）
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// 値がどの書式パターンに一致するか表示
    Patterns {
        /// 調べる文字列（省略時は標準入力）
        values: Vec<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を変更 (key=value)
        #[arg(long)]
        set: Vec<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 設定ファイルのパスを表示
        #[arg(long)]
        path: bool,
    },
}
