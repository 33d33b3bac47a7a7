//! Public API Types
//!
//! 分配処理の結果として公開APIが返す型を定義するモジュール。

use serde::Serialize;

use crate::output::OutputTable;
use crate::rules::RuleTable;

/// 1回の実行の集計
///
/// `serde`でシリアライズでき、CLIは実行後にJSONとしてログへ出力します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistributionSummary {
    /// 処理した注文行の数（空白行を除く）
    pub input_rows: usize,

    /// 読み飛ばした空白行の数
    pub skipped_blank_rows: usize,

    /// 出力行の数
    pub output_rows: usize,

    /// 規則に一致して展開された注文の数
    pub expanded_orders: usize,

    /// 規則に一致せずそのまま出力された注文の数
    pub passthrough_orders: usize,

    /// 読み込んだ分配規則のグループ数
    pub rule_groups: usize,

    /// 結果ファイルのパス（ファイルに保存した場合のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

/// メモリ上での分配処理の結果
#[derive(Debug, Clone)]
pub struct DistributionResult {
    /// 使用した分配規則
    pub rules: RuleTable,

    /// 出力の表
    pub table: OutputTable,

    /// 集計
    pub summary: DistributionSummary,
}
