//! Logging Module
//!
//! tracing-subscriberによるログ出力の初期化。

use tracing_subscriber::{fmt, EnvFilter};

/// ログ出力を初期化する
///
/// # 環境変数
///
/// * `RUST_LOG` - ログレベルのフィルター（既定: `info`）
///   例: `RUST_LOG=debug`、`RUST_LOG=order_distributor=trace`
///
/// # 使用例
///
/// ```rust,no_run
/// use order_distributor::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// テスト用にログ出力を初期化する
///
/// `debug`レベルでテストの出力に書き出します。複数回呼び出しても問題ありません。
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
