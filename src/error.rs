use thiserror::Error;

/// アプリケーション層のエラー
///
/// セル単位の解析失敗は `cellsense_common::ParseError` で値として返すので、ここには含めない。
#[derive(Error, Debug)]
pub enum CellsenseError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("入力エラー: {0}")]
    Input(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CellsenseError>;
