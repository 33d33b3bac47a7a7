//! Distribution Rules Module
//!
//! 分配規則シートを「グループキー → 構成品リスト」の表に変換する。
//!
//! 規則シートではグループキーが最初の行にだけ書かれ、続く行は空欄のまま
//! 構成品が並びます。空欄の行は直前のグループキーを引き継ぎます。

use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::error::DistributorError;
use crate::header::{self, ColumnLookup};
use crate::types::{CellValue, ComponentRule, SheetTable};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// グループキーから構成品リストへの対応表
///
/// キーはシートに現れた順序を保持します。構築後は変更されません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    entries: Vec<(String, Vec<ComponentRule>)>,
    index: HashMap<String, usize>,
}

impl RuleTable {
    /// 分配規則シートから対応表を構築する
    ///
    /// 必須の列が見つからない場合は空の表を返し、エラーをログに記録します。
    /// 規則がない状態として処理を継続させるためです。
    pub fn build(rules: &SheetTable) -> RuleTable {
        match Self::try_build(rules) {
            Ok(table) => table,
            Err(e) => {
                error!(error = %e, "failed to build distribution rules");
                RuleTable::default()
            }
        }
    }

    /// 分配規則シートから対応表を構築する（エラーを返すバージョン）
    ///
    /// # 列の特定
    ///
    /// * グループキー列: 見つからない場合は先頭列
    /// * 構成商品コード列: 必須
    /// * トップセラーコード列・EA数量列: 任意（なければ空文字列・0）
    ///
    /// # 戻り値
    ///
    /// * `Ok(RuleTable)` - 構築した対応表
    /// * `Err(DistributorError::MissingColumn)` - 必須の列が見つからない場合
    pub fn try_build(rules: &SheetTable) -> Result<RuleTable, DistributorError> {
        let headers = &rules.headers;

        let group_col = match header::resolve(headers, &header::GROUP_KEY) {
            ColumnLookup::Found(index) => index,
            ColumnLookup::NotFound if !headers.is_empty() => {
                debug!("group key column not found, falling back to the first column");
                0
            }
            ColumnLookup::NotFound => {
                return Err(DistributorError::missing_column(
                    "rules",
                    header::GROUP_KEY.label,
                ))
            }
        };
        let component_col = header::resolve(headers, &header::COMPONENT_CODE)
            .index()
            .ok_or_else(|| {
                DistributorError::missing_column("rules", header::COMPONENT_CODE.label)
            })?;
        let seller_col = header::resolve(headers, &header::SELLER_CODE).index();
        let ea_col = header::resolve(headers, &header::EA_QUANTITY).index();

        let mut table = RuleTable::default();
        let mut current_key: Option<String> = None;

        for row in &rules.rows {
            let cell = |col: usize| row.get(col).unwrap_or(&EMPTY_CELL);

            if let Some(key) = cell(group_col).as_trimmed_text() {
                table.ensure_group(&key);
                current_key = Some(key);
            }

            let Some(key) = current_key.as_deref() else {
                continue;
            };
            let Some(component_code) = cell(component_col).as_trimmed_text() else {
                continue;
            };

            let seller_code = seller_col
                .and_then(|col| cell(col).as_trimmed_text())
                .unwrap_or_default();
            let ea_quantity = ea_col.map_or(0, |col| parse_ea_quantity(cell(col)));

            table.push_component(
                key,
                ComponentRule {
                    component_code,
                    seller_code,
                    ea_quantity,
                },
            );
        }

        if table.is_empty() {
            warn!("distribution rules sheet contains no groups");
        } else {
            info!(
                groups = table.len(),
                components = table.component_count(),
                "distribution rules loaded"
            );
            for (key, components) in table.iter() {
                debug!(key, components = components.len(), "rule group");
            }
        }

        Ok(table)
    }

    /// グループと構成品の組から対応表を構築する
    ///
    /// 同じキーが複数回現れた場合、構成品は同じエントリに追加されます。
    pub fn from_groups<I, K>(groups: I) -> RuleTable
    where
        I: IntoIterator<Item = (K, Vec<ComponentRule>)>,
        K: Into<String>,
    {
        let mut table = RuleTable::default();
        for (key, components) in groups {
            let key = key.into();
            table.ensure_group(&key);
            for component in components {
                table.push_component(&key, component);
            }
        }
        table
    }

    fn ensure_group(&mut self, key: &str) {
        if !self.index.contains_key(key) {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), Vec::new()));
        }
    }

    fn push_component(&mut self, key: &str, component: ComponentRule) {
        if let Some(&position) = self.index.get(key) {
            self.entries[position].1.push(component);
        }
    }

    /// キーに対応する構成品リストを取得
    pub fn get(&self, key: &str) -> Option<&[ComponentRule]> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.as_slice())
    }

    /// キーと構成品リストをシート上の順序で列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ComponentRule])> {
        self.entries
            .iter()
            .map(|(key, components)| (key.as_str(), components.as_slice()))
    }

    /// キーをシート上の順序で列挙
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// グループ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 全グループの構成品の合計数
    pub fn component_count(&self) -> usize {
        self.entries.iter().map(|(_, components)| components.len()).sum()
    }
}

/// EA数量セルを0以上の整数に変換する
///
/// 単位（`" EA"` / `"EA"`）を取り除いてから整数、続いて小数として解析し、
/// 小数は切り捨てます。どちらでも解析できない値、負の値、有限でない値は0とします。
///
/// # 使用例
///
/// ```rust
/// use order_distributor::rules::parse_ea_quantity;
/// use order_distributor::CellValue;
///
/// assert_eq!(parse_ea_quantity(&CellValue::String("3 EA".to_string())), 3);
/// assert_eq!(parse_ea_quantity(&CellValue::Number(2.9)), 2);
/// assert_eq!(parse_ea_quantity(&CellValue::String("N/A".to_string())), 0);
/// ```
pub fn parse_ea_quantity(cell: &CellValue) -> u64 {
    let parsed = match cell {
        CellValue::Empty => return 0,
        CellValue::Number(n) => float_to_count(*n),
        other => {
            let raw = other.as_raw_string();
            let text = raw.replace(" EA", "").replace("EA", "");
            parse_count(text.trim())
        }
    };

    parsed.unwrap_or_else(|| {
        debug!(value = ?cell, "unparsable EA quantity, using 0");
        0
    })
}

/// 出力セル（f64）で正確に表せる数量の上限（2^53）
pub const MAX_EXACT_COUNT: u64 = 1 << 53;

/// 数量文字列を整数、続いて小数として解析する
///
/// `MAX_EXACT_COUNT`を超える値は解析失敗とします。
pub(crate) fn parse_count(text: &str) -> Option<u64> {
    match text.parse::<i64>() {
        Ok(value) => u64::try_from(value)
            .ok()
            .filter(|&count| count <= MAX_EXACT_COUNT),
        Err(_) => text.parse::<f64>().ok().and_then(float_to_count),
    }
}

pub(crate) fn float_to_count(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let count = value.trunc();
    if count > MAX_EXACT_COUNT as f64 {
        None
    } else {
        Some(count as u64)
    }
}
