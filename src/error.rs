//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// order-distributorクレート全体で使用するエラー型
///
/// 注文ファイル・分配規則ファイルの読み込み、分配処理、結果ファイルの書き込み中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: 入力ワークブックの解析エラー（calamine由来）
/// - `Write`: 結果ワークブックの生成エラー（rust_xlsxwriter由来）
/// - `FileNotFound`: 必須の入力ファイルが存在しない
/// - `MissingColumn`: 必須の列がヘッダーから見つからない
/// - `Config`: 設定の検証に失敗したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use order_distributor::DistributorError;
/// use std::fs::File;
///
/// fn open_orders(path: &str) -> Result<File, DistributorError> {
///     let file = File::open(path)?; // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum DistributorError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 入力ワークブックの解析中に発生したエラー
    ///
    /// calamineがファイルを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// 結果ワークブックの書き込み中に発生したエラー
    #[error("Failed to write Excel file: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// 必須の入力ファイルが存在しない
    ///
    /// `role`には「order」「rules」などファイルの役割が入ります。
    #[error("{role} file not found: {path}")]
    FileNotFound {
        /// ファイルの役割
        role: String,
        /// 探索したパス
        path: String,
    },

    /// 必須の列がヘッダー行から見つからない
    #[error("Column '{column}' not found in {table} header")]
    MissingColumn {
        /// テーブルの種類（order / rules）
        table: String,
        /// 探索した列の説明
        column: String,
    },

    /// ワークブックにシートが存在しない、またはヘッダー行がない
    #[error("Workbook has no worksheet with a header row")]
    EmptyWorkbook,

    /// 設定の検証に失敗したエラー
    ///
    /// `DistributorBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use order_distributor::{DistributorBuilder, DistributorError};
    ///
    /// let result = DistributorBuilder::new()
    ///     .with_sheet_name("bad/name")
    ///     .build();
    ///
    /// match result {
    ///     Err(DistributorError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 設定ファイル（JSON）の解析エラー
    #[error("Failed to read configuration file: {0}")]
    ConfigFile(#[from] serde_json::Error),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズの上限を超えた場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl DistributorError {
    pub(crate) fn missing_column(table: &str, column: &str) -> Self {
        DistributorError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
