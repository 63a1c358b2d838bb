use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ログ出力を初期化（標準エラーへ出力、標準出力は JSON 用に空けておく）
///
/// `RUST_LOG` が設定されていればそちらを優先する。
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "cellsense=debug" } else { "cellsense=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // テストなどで二重に呼ばれても失敗にしない
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
