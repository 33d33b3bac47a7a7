//! Order Rows Module
//!
//! 注文シートの1行を読み取り専用で参照し、商品名と購入数量を取り出す。

use tracing::debug;

use crate::error::DistributorError;
use crate::header::{self, ColumnLookup};
use crate::rules::float_to_count;
use crate::types::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// 注文シートで特定した列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderColumns {
    /// 商品名列
    pub product_name: usize,
    /// 購入数量列（ない場合は数量1として扱う）
    pub purchase_quantity: Option<usize>,
}

impl OrderColumns {
    /// ヘッダー行から商品名列と購入数量列を特定する
    ///
    /// # 戻り値
    ///
    /// * `Ok(OrderColumns)` - 商品名列が見つかった場合
    /// * `Err(DistributorError::MissingColumn)` - 商品名列が見つからない場合
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, DistributorError> {
        let product_name = match header::resolve(headers, &header::PRODUCT_NAME) {
            ColumnLookup::Found(index) => index,
            ColumnLookup::NotFound => {
                return Err(DistributorError::missing_column(
                    "order",
                    header::PRODUCT_NAME.label,
                ))
            }
        };
        let purchase_quantity = header::resolve(headers, &header::PURCHASE_QUANTITY).index();

        Ok(Self {
            product_name,
            purchase_quantity,
        })
    }
}

/// 注文シートの1行
///
/// 入力のセルを借用するだけで、変更はしません。
#[derive(Debug, Clone, Copy)]
pub struct OrderRow<'a> {
    cells: &'a [CellValue],
    product_name: &'a CellValue,
    raw_quantity: Option<&'a CellValue>,
    purchase_quantity: u64,
}

impl<'a> OrderRow<'a> {
    /// 行のセルと列の特定結果から注文行を生成
    ///
    /// 購入数量はこの時点で0以上の整数に変換されます（`coerce_purchase_quantity`）。
    pub fn new(cells: &'a [CellValue], columns: &OrderColumns) -> Self {
        let product_name = cells.get(columns.product_name).unwrap_or(&EMPTY_CELL);
        let raw_quantity = columns
            .purchase_quantity
            .map(|col| cells.get(col).unwrap_or(&EMPTY_CELL));

        Self {
            cells,
            product_name,
            raw_quantity,
            purchase_quantity: coerce_purchase_quantity(raw_quantity),
        }
    }

    /// 行のすべてのセル
    pub fn cells(&self) -> &'a [CellValue] {
        self.cells
    }

    /// 商品名（空白の場合は`None`）
    pub fn product_name(&self) -> Option<String> {
        self.product_name.as_trimmed_text()
    }

    /// 商品名セルの元の値
    pub fn raw_product_name(&self) -> &'a CellValue {
        self.product_name
    }

    /// 購入数量セルの元の値（購入数量列がない場合は`None`）
    pub fn raw_purchase_quantity(&self) -> Option<&'a CellValue> {
        self.raw_quantity
    }

    /// 0以上の整数に変換した購入数量
    pub fn purchase_quantity(&self) -> u64 {
        self.purchase_quantity
    }

    /// すべてのセルが空白かどうか
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

/// 購入数量セルを0以上の整数に変換する
///
/// 値がない、解析できない、負の値、有限でない場合は1とします。
/// 出力セルで正確に表せない値（`MAX_EXACT_COUNT`超）も解析できないものとして扱います。
/// `"2.7"`のような小数は切り捨てます。
pub fn coerce_purchase_quantity(cell: Option<&CellValue>) -> u64 {
    let parsed = match cell {
        None | Some(CellValue::Empty) => return 1,
        Some(CellValue::Number(n)) => float_to_count(*n),
        Some(CellValue::Bool(b)) => Some(u64::from(*b)),
        Some(CellValue::String(s)) => s.trim().parse::<f64>().ok().and_then(float_to_count),
        Some(CellValue::DateTime(_)) | Some(CellValue::Error(_)) => None,
    };

    parsed.unwrap_or_else(|| {
        debug!(value = ?cell, "unparsable purchase quantity, using 1");
        1
    })
}
