//! Builder Module
//!
//! Fluent Builder APIを提供し、`Distributor`インスタンスを段階的に構築する。
//! `Distributor`は注文ファイルの読み込みから結果ファイルの保存までを実行します。

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::api::{DistributionResult, DistributionSummary};
use crate::error::DistributorError;
use crate::expander::{Expander, OutputLayout};
use crate::matcher::match_product;
use crate::order::{OrderColumns, OrderRow};
use crate::output::{OutputTable, ShadingWriter, DEFAULT_SHADE_COLOR};
use crate::parser::{load_table, WorkbookParser};
use crate::rules::RuleTable;
use crate::types::SheetTable;

/// 既定の注文ファイル名
pub const DEFAULT_INPUT_FILE: &str = "Krone Order_20251106.xlsx";
/// 既定の分配規則ファイル名
pub const DEFAULT_RULES_FILE: &str = "손으로나누는작업.xlsx";
/// 既定の結果ファイル名の接頭辞
pub const DEFAULT_OUTPUT_PREFIX: &str = "분배결과_";
/// 既定の結果シート名
pub const DEFAULT_SHEET_NAME: &str = "분배 결과";

const MAX_SHEET_NAME_CHARS: usize = 31;
const INVALID_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// 分配処理の設定
///
/// JSON設定ファイルから読み込む場合、省略した項目は既定値になります。
///
/// ```json
/// { "input_path": "orders.xlsx", "shade_color": 13421772 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DistributorConfig {
    /// 注文ファイルのパス
    pub input_path: PathBuf,

    /// 分配規則ファイルのパス
    pub rules_path: PathBuf,

    /// 結果ファイルを保存するディレクトリ
    pub output_dir: PathBuf,

    /// 結果ファイル名の接頭辞（後ろに`YYYYMMDD_HHMMSS.xlsx`が付く）
    pub output_prefix: String,

    /// 結果シート名
    pub sheet_name: String,

    /// 網掛け色（`0xRRGGBB`）
    pub shade_color: u32,

    /// 入力ファイルサイズの上限（バイト）
    pub max_input_file_size: u64,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            rules_path: PathBuf::from(DEFAULT_RULES_FILE),
            output_dir: PathBuf::from("."),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            shade_color: DEFAULT_SHADE_COLOR,
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目に既定値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use order_distributor::DistributorBuilder;
///
/// # fn main() -> Result<(), order_distributor::DistributorError> {
/// let distributor = DistributorBuilder::new()
///     .with_input_path("orders.xlsx")
///     .with_rules_path("rules.xlsx")
///     .with_output_dir("out")
///     .build()?;
/// let summary = distributor.run()?;
/// println!("{} rows written", summary.output_rows);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct DistributorBuilder {
    config: DistributorConfig,
}

impl DistributorBuilder {
    /// 既定の設定を持つビルダーを生成する
    ///
    /// # 既定の設定
    ///
    /// - 注文ファイル: `Krone Order_20251106.xlsx`
    /// - 分配規則ファイル: `손으로나누는작업.xlsx`
    /// - 結果ファイル: カレントディレクトリの`분배결과_YYYYMMDD_HHMMSS.xlsx`
    /// - 結果シート名: `분배 결과`
    /// - 網掛け色: `#E0E0E0`
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON設定ファイルから設定を読み込んだビルダーを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(DistributorBuilder)` - 読み込みに成功した場合
    /// * `Err(DistributorError::Io)` - ファイルを読めない場合
    /// * `Err(DistributorError::ConfigFile)` - JSONとして解析できない場合
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DistributorError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: DistributorConfig = serde_json::from_str(&text)?;
        debug!(path = %path.as_ref().display(), ?config, "configuration file loaded");
        Ok(Self { config })
    }

    /// 注文ファイルのパスを指定する
    pub fn with_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_path = path.into();
        self
    }

    /// 分配規則ファイルのパスを指定する
    pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rules_path = path.into();
        self
    }

    /// 結果ファイルを保存するディレクトリを指定する
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 結果ファイル名の接頭辞を指定する
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = prefix.into();
        self
    }

    /// 結果シート名を指定する
    ///
    /// Excelの制約により、31文字以内で`[]:*?/\`を含まない名前である必要があります。
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    /// 網掛け色を`0xRRGGBB`で指定する
    pub fn with_shade_color(mut self, color: u32) -> Self {
        self.config.shade_color = color;
        self
    }

    /// 入力ファイルサイズの上限（バイト）を指定する
    pub fn with_max_input_file_size(mut self, bytes: u64) -> Self {
        self.config.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Distributor`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `DistributorError::Config(String)`: 設定の検証に失敗した場合
    ///   * 結果ファイル名の接頭辞が空、またはパス区切り文字を含む
    ///   * シート名が空、31文字を超える、または使用できない文字を含む
    ///   * 網掛け色が`0xFFFFFF`を超える
    ///   * 入力ファイルサイズの上限が0
    pub fn build(self) -> Result<Distributor, DistributorError> {
        let config = &self.config;

        if config.output_prefix.is_empty() {
            return Err(DistributorError::Config(
                "Output prefix must not be empty".to_string(),
            ));
        }
        if config.output_prefix.contains(['/', '\\']) {
            return Err(DistributorError::Config(format!(
                "Output prefix must not contain path separators: '{}'",
                config.output_prefix
            )));
        }

        let name_len = config.sheet_name.chars().count();
        if name_len == 0 || name_len > MAX_SHEET_NAME_CHARS {
            return Err(DistributorError::Config(format!(
                "Sheet name must be 1 to {} characters: '{}'",
                MAX_SHEET_NAME_CHARS, config.sheet_name
            )));
        }
        if config.sheet_name.contains(INVALID_SHEET_NAME_CHARS)
            || config.sheet_name.starts_with('\'')
            || config.sheet_name.ends_with('\'')
        {
            return Err(DistributorError::Config(format!(
                "Invalid sheet name: '{}'",
                config.sheet_name
            )));
        }

        if config.shade_color > 0xFF_FF_FF {
            return Err(DistributorError::Config(format!(
                "Invalid shade color: {:#X}",
                config.shade_color
            )));
        }

        if config.max_input_file_size == 0 {
            return Err(DistributorError::Config(
                "Maximum input file size must be greater than zero".to_string(),
            ));
        }

        Ok(Distributor::new(self.config))
    }
}

/// 結果ファイル名を生成する（`<prefix>YYYYMMDD_HHMMSS.xlsx`）
///
/// # 使用例
///
/// ```rust
/// use chrono::NaiveDate;
/// use order_distributor::output_file_name;
///
/// let timestamp = NaiveDate::from_ymd_opt(2025, 11, 6)
///     .unwrap()
///     .and_hms_opt(9, 30, 5)
///     .unwrap();
/// assert_eq!(output_file_name("분배결과_", timestamp), "분배결과_20251106_093005.xlsx");
/// ```
pub fn output_file_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{}{}.xlsx", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}

/// 分配処理のファサード
///
/// 注文ファイルと分配規則ファイルを読み込み、注文を構成品ごとに展開して
/// 網掛けつきの結果ファイルを書き出します。
#[derive(Debug)]
pub struct Distributor {
    config: DistributorConfig,
}

impl Distributor {
    pub(crate) fn new(config: DistributorConfig) -> Self {
        Self { config }
    }

    /// 現在の設定
    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    /// 設定されたファイルで分配処理を実行し、結果ファイルを保存する
    ///
    /// # 処理フロー
    ///
    /// 1. 注文ファイル・分配規則ファイルの存在確認（なければ処理前に中断）
    /// 2. 注文ファイルの読み込み
    /// 3. 分配規則の構築（失敗しても規則なしとして継続）
    /// 4. 各注文行の照合と展開
    /// 5. `<output_dir>/<prefix>YYYYMMDD_HHMMSS.xlsx`への保存
    ///
    /// # 戻り値
    ///
    /// * `Ok(DistributionSummary)` - 実行の集計（`output_path`を含む）
    /// * `Err(DistributorError::FileNotFound)` - 入力ファイルが存在しない場合
    /// * `Err(DistributorError::MissingColumn)` - 注文ファイルに商品名列がない場合
    pub fn run(&self) -> Result<DistributionSummary, DistributorError> {
        let config = &self.config;
        ensure_exists(&config.input_path, "order")?;
        ensure_exists(&config.rules_path, "rules")?;

        info!(path = %config.input_path.display(), "reading orders");
        let orders = load_table(&config.input_path, "order", config.max_input_file_size)?;

        info!(path = %config.rules_path.display(), "reading distribution rules");
        let rules = load_table(&config.rules_path, "rules", config.max_input_file_size)
            .map(|table| RuleTable::build(&table))
            .unwrap_or_else(|e| {
                error!(error = %e, "failed to read distribution rules");
                RuleTable::default()
            });

        let result = self.distribute_tables(&orders, rules)?;

        let file_name = output_file_name(&config.output_prefix, Local::now().naive_local());
        let output_path = config.output_dir.join(file_name);
        self.writer().save(&result.table, &output_path)?;

        let summary = DistributionSummary {
            output_path: Some(output_path.display().to_string()),
            ..result.summary
        };
        info!(
            output = %output_path.display(),
            rows = summary.output_rows,
            "distribution completed"
        );
        Ok(summary)
    }

    /// メモリ上のワークブックで分配処理を実行する
    ///
    /// 分配規則のワークブックを解析できない場合は、規則なしとして処理を続けます。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use order_distributor::DistributorBuilder;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), order_distributor::DistributorError> {
    /// let distributor = DistributorBuilder::new().build()?;
    /// let result = distributor.distribute(File::open("orders.xlsx")?, File::open("rules.xlsx")?)?;
    /// let mut output = Vec::new();
    /// distributor.write(&result, &mut output)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn distribute<R1, R2>(&self, orders: R1, rules: R2) -> Result<DistributionResult, DistributorError>
    where
        R1: Read + Seek,
        R2: Read + Seek,
    {
        let max = self.config.max_input_file_size;
        let orders = WorkbookParser::open(orders, max)?.first_sheet_table()?;

        let rules = WorkbookParser::open(rules, max)
            .and_then(|mut parser| parser.first_sheet_table())
            .map(|table| RuleTable::build(&table))
            .unwrap_or_else(|e| {
                error!(error = %e, "failed to read distribution rules");
                RuleTable::default()
            });

        self.distribute_tables(&orders, rules)
    }

    /// 分配結果をXLSX形式でライターに書き出す
    pub fn write<W: Write>(&self, result: &DistributionResult, writer: W) -> Result<(), DistributorError> {
        self.writer().write(&result.table, writer)
    }

    /// 読み込み済みの注文表と分配規則で分配処理を実行する
    ///
    /// 空白行は読み飛ばします。規則に一致した注文は構成品ごとに展開し、
    /// 一致しない注文（構成品が空のグループを含む）は1行のパススルー行にします。
    pub fn distribute_tables(
        &self,
        orders: &SheetTable,
        rules: RuleTable,
    ) -> Result<DistributionResult, DistributorError> {
        let columns = OrderColumns::resolve(&orders.headers).map_err(|e| {
            error!(columns = ?orders.headers, "product name column not found");
            e
        })?;

        if rules.is_empty() {
            warn!("no distribution rules available, all orders pass through unchanged");
        }

        let expander = Expander::new(OutputLayout::new(&orders.headers));
        let mut table = OutputTable::new(expander.layout().clone());
        let mut summary = DistributionSummary {
            rule_groups: rules.len(),
            ..Default::default()
        };

        for (index, cells) in orders.rows.iter().enumerate() {
            let order = OrderRow::new(cells, &columns);
            if order.is_blank() {
                summary.skipped_blank_rows += 1;
                continue;
            }
            summary.input_rows += 1;

            let quantity = order.purchase_quantity();
            let product_name = order.product_name();
            let matched = product_name
                .as_deref()
                .and_then(|name| match_product(name, &rules))
                .filter(|m| !m.components.is_empty());

            match matched {
                Some(m) => {
                    let rows = expander.expand(&order, m.components, quantity);
                    debug!(
                        row = index + 1,
                        product = product_name.as_deref().unwrap_or_default(),
                        key = m.key,
                        rule = m.rule,
                        generated = rows.len(),
                        "order expanded"
                    );
                    summary.expanded_orders += 1;
                    table.extend(rows);
                }
                None => {
                    debug!(
                        row = index + 1,
                        product = product_name.as_deref().unwrap_or_default(),
                        "no rule matched, passing through"
                    );
                    summary.passthrough_orders += 1;
                    table.extend(Some(expander.passthrough(&order, quantity)));
                }
            }
        }

        summary.output_rows = table.rows().len();
        info!(
            orders = summary.input_rows,
            expanded = summary.expanded_orders,
            passthrough = summary.passthrough_orders,
            output_rows = summary.output_rows,
            "orders distributed"
        );

        Ok(DistributionResult {
            rules,
            table,
            summary,
        })
    }

    fn writer(&self) -> ShadingWriter {
        ShadingWriter::new(self.config.sheet_name.clone(), self.config.shade_color)
    }
}

fn ensure_exists(path: &Path, role: &str) -> Result<(), DistributorError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DistributorError::FileNotFound {
            role: role.to_string(),
            path: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellValue, ComponentRule};
    use chrono::NaiveDate;
    use std::io::Write as _;

    fn s(text: &str) -> CellValue {
        CellValue::String(text.to_string())
    }

    fn orders() -> SheetTable {
        SheetTable::new(
            vec!["주문번호".to_string(), "상품명".to_string(), "구매 수량".to_string()],
            vec![
                vec![s("O-1"), s("Profutura Pre Stage"), CellValue::Number(2.0)],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
                vec![s("O-2"), s("Unknown Widget"), CellValue::Number(3.0)],
                vec![s("O-3"), s("Pronutra VP 1"), s("abc")],
            ],
        )
    }

    fn rules() -> RuleTable {
        RuleTable::from_groups(vec![
            (
                "3PF PRE+IF",
                vec![ComponentRule::new("C1", "S1", 1), ComponentRule::new("C2", "S2", 2)],
            ),
            ("3PN1+IF", vec![]),
        ])
    }

    #[test]
    fn test_builder_defaults() {
        let builder = DistributorBuilder::new();
        assert_eq!(builder.config.input_path, PathBuf::from(DEFAULT_INPUT_FILE));
        assert_eq!(builder.config.rules_path, PathBuf::from(DEFAULT_RULES_FILE));
        assert_eq!(builder.config.output_prefix, DEFAULT_OUTPUT_PREFIX);
        assert_eq!(builder.config.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(builder.config.shade_color, 0xE0E0E0);
    }

    #[test]
    fn test_builder_method_chaining() {
        let distributor = DistributorBuilder::new()
            .with_input_path("in.xlsx")
            .with_rules_path("rules.xlsx")
            .with_output_dir("out")
            .with_output_prefix("result_")
            .with_sheet_name("Result")
            .with_shade_color(0xCCCCCC)
            .with_max_input_file_size(1024)
            .build()
            .unwrap();

        let config = distributor.config();
        assert_eq!(config.input_path, PathBuf::from("in.xlsx"));
        assert_eq!(config.rules_path, PathBuf::from("rules.xlsx"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.output_prefix, "result_");
        assert_eq!(config.sheet_name, "Result");
        assert_eq!(config.shade_color, 0xCCCCCC);
        assert_eq!(config.max_input_file_size, 1024);
    }

    #[test]
    fn test_build_rejects_invalid_settings() {
        let cases = vec![
            (DistributorBuilder::new().with_output_prefix(""), "prefix"),
            (DistributorBuilder::new().with_output_prefix("a/b_"), "path separators"),
            (DistributorBuilder::new().with_sheet_name(""), "Sheet name"),
            (DistributorBuilder::new().with_sheet_name("x".repeat(32)), "Sheet name"),
            (DistributorBuilder::new().with_sheet_name("a:b"), "Invalid sheet name"),
            (DistributorBuilder::new().with_shade_color(0x1000000), "shade color"),
            (DistributorBuilder::new().with_max_input_file_size(0), "input file size"),
        ];

        for (builder, expected) in cases {
            match builder.build() {
                Err(DistributorError::Config(msg)) => {
                    assert!(msg.contains(expected), "'{}' should contain '{}'", msg, expected)
                }
                other => panic!("Expected Config error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_from_json_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "input_path": "orders.xlsx", "shade_color": 13421772 }}"#).unwrap();

        let builder = DistributorBuilder::from_json_file(file.path()).unwrap();
        assert_eq!(builder.config.input_path, PathBuf::from("orders.xlsx"));
        assert_eq!(builder.config.shade_color, 0xCCCCCC);
        assert_eq!(builder.config.rules_path, PathBuf::from(DEFAULT_RULES_FILE));
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2").unwrap();

        match DistributorBuilder::from_json_file(file.path()) {
            Err(DistributorError::ConfigFile(_)) => {}
            other => panic!("Expected ConfigFile error, got {:?}", other),
        }
    }

    #[test]
    fn test_output_file_name() {
        let timestamp = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(output_file_name("out_", timestamp), "out_20250102_030405.xlsx");
    }

    #[test]
    fn test_distribute_tables() {
        crate::logging::init_test();
        let distributor = DistributorBuilder::new().build().unwrap();
        let result = distributor.distribute_tables(&orders(), rules()).unwrap();

        let summary = &result.summary;
        assert_eq!(summary.input_rows, 3);
        assert_eq!(summary.skipped_blank_rows, 1);
        assert_eq!(summary.expanded_orders, 1);
        // the empty 3PN1+IF group passes through
        assert_eq!(summary.passthrough_orders, 2);
        assert_eq!(summary.output_rows, 4);
        assert_eq!(summary.rule_groups, 2);

        let rows = result.table.rows();
        let codes: Vec<_> = rows.iter().map(|row| row.component_code()).collect();
        assert_eq!(codes, vec!["C1", "C2", "", ""]);
        assert_eq!(result.table.expanded_row_count(), 2);

        let ea = result.table.layout().ea_quantity_column();
        assert_eq!(rows[0].cells()[ea], CellValue::Number(2.0));
        assert_eq!(rows[1].cells()[ea], CellValue::Number(4.0));
        assert_eq!(rows[2].cells()[ea], CellValue::Number(3.0));
        assert_eq!(rows[3].cells()[ea], CellValue::Number(1.0));
    }

    #[test]
    fn test_distribute_tables_without_rules() {
        let distributor = DistributorBuilder::new().build().unwrap();
        let result = distributor
            .distribute_tables(&orders(), RuleTable::default())
            .unwrap();

        assert_eq!(result.summary.expanded_orders, 0);
        assert_eq!(result.summary.passthrough_orders, 3);
        assert_eq!(result.table.expanded_row_count(), 0);
    }

    #[test]
    fn test_distribute_tables_without_product_column() {
        let distributor = DistributorBuilder::new().build().unwrap();
        let orders = SheetTable::new(vec!["주문번호".to_string()], vec![vec![s("O-1")]]);

        match distributor.distribute_tables(&orders, rules()) {
            Err(DistributorError::MissingColumn { table, .. }) => assert_eq!(table, "order"),
            other => panic!("Expected MissingColumn error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_with_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let distributor = DistributorBuilder::new()
            .with_input_path(dir.path().join("missing.xlsx"))
            .with_rules_path(dir.path().join("rules.xlsx"))
            .with_output_dir(dir.path())
            .build()
            .unwrap();

        match distributor.run() {
            Err(DistributorError::FileNotFound { role, .. }) => assert_eq!(role, "order"),
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_ensure_exists() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_exists(file.path(), "rules").is_ok());

        match ensure_exists(Path::new("does/not/exist.xlsx"), "rules") {
            Err(DistributorError::FileNotFound { role, path }) => {
                assert_eq!(role, "rules");
                assert!(path.contains("exist.xlsx"));
            }
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
    }
}
