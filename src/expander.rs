//! Order Expander Module
//!
//! 注文行を構成品ごとの出力行に展開する。規則に一致しなかった注文は
//! そのまま1行の出力行（パススルー行）になります。

use tracing::debug;

use crate::order::OrderRow;
use crate::rules::MAX_EXACT_COUNT;
use crate::types::{CellValue, ComponentRule};

/// 出力列: 構成商品コード
pub const COMPONENT_CODE_HEADER: &str = "구성 상품코드";
/// 出力列: 構成商品のトップセラーコード
pub const SELLER_CODE_HEADER: &str = "구성 상품 탑셀러 코드";
/// 出力列: EA数量
pub const EA_QUANTITY_HEADER: &str = "EA 수량";
/// 出力列: 元の商品名
pub const ORIGINAL_PRODUCT_NAME_HEADER: &str = "원본 상품명";
/// 出力列: 元の購入数量
pub const ORIGINAL_PURCHASE_QUANTITY_HEADER: &str = "원본 구매 수량";

/// 出力シートの列構成
///
/// 入力のヘッダーをそのままの順序で並べ、その後ろに派生列を追加します。
/// 入力に同名の列がある場合は追加せず、その列を上書きします。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    headers: Vec<String>,
    component_code: usize,
    seller_code: usize,
    ea_quantity: usize,
    original_product_name: usize,
    original_purchase_quantity: usize,
}

impl OutputLayout {
    /// 入力のヘッダーから出力の列構成を生成
    pub fn new<S: AsRef<str>>(input_headers: &[S]) -> Self {
        let mut headers: Vec<String> = input_headers
            .iter()
            .map(|header| header.as_ref().to_string())
            .collect();

        let mut column = |name: &str| match headers.iter().position(|header| header == name) {
            Some(index) => index,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        };

        let component_code = column(COMPONENT_CODE_HEADER);
        let seller_code = column(SELLER_CODE_HEADER);
        let ea_quantity = column(EA_QUANTITY_HEADER);
        let original_product_name = column(ORIGINAL_PRODUCT_NAME_HEADER);
        let original_purchase_quantity = column(ORIGINAL_PURCHASE_QUANTITY_HEADER);

        Self {
            headers,
            component_code,
            seller_code,
            ea_quantity,
            original_product_name,
            original_purchase_quantity,
        }
    }

    /// 出力のヘッダー行
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// 構成商品コード列のインデックス
    pub fn component_code_column(&self) -> usize {
        self.component_code
    }

    /// EA数量列のインデックス
    pub fn ea_quantity_column(&self) -> usize {
        self.ea_quantity
    }
}

/// 出力シートの1行
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    cells: Vec<CellValue>,
    component_column: usize,
}

impl OutputRow {
    /// 行のすべてのセル（`OutputLayout::headers()`と同じ順序）
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// 構成商品コード（パススルー行では空文字列）
    pub fn component_code(&self) -> String {
        self.cells[self.component_column].as_raw_string()
    }

    /// 展開によって生成された行かどうか
    ///
    /// 構成商品コードが空白でない行を展開行とみなします。出力時に網掛けされます。
    pub fn is_expanded(&self) -> bool {
        !self.cells[self.component_column].is_blank()
    }
}

/// 注文行を出力行に展開する
#[derive(Debug, Clone)]
pub struct Expander {
    layout: OutputLayout,
}

impl Expander {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    /// 出力の列構成
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// 構成品ごとに1行ずつ出力行を生成する
    ///
    /// 各行は注文行のすべてのセルを複製し、派生列を設定します。
    /// EA数量は構成品のEA数量 × `multiplier`です。
    ///
    /// # 引数
    ///
    /// * `order` - 注文行
    /// * `components` - 一致したグループの構成品リスト
    /// * `multiplier` - 購入数量
    ///
    /// # 戻り値
    ///
    /// 構成品リストと同じ順序・同じ件数の出力行
    pub fn expand(
        &self,
        order: &OrderRow<'_>,
        components: &[ComponentRule],
        multiplier: u64,
    ) -> Vec<OutputRow> {
        let original_quantity = order
            .raw_purchase_quantity()
            .cloned()
            .unwrap_or(CellValue::Number(multiplier as f64));

        components
            .iter()
            .map(|component| {
                self.derive_row(
                    order,
                    CellValue::String(component.component_code.clone()),
                    CellValue::String(component.seller_code.clone()),
                    CellValue::Number(ea_total(component.ea_quantity, multiplier)),
                    original_quantity.clone(),
                )
            })
            .collect()
    }

    /// 規則に一致しなかった注文のパススルー行を生成する
    ///
    /// 構成商品コードとトップセラーコードは空文字列、EA数量と元の購入数量は
    /// `multiplier`になります。
    pub fn passthrough(&self, order: &OrderRow<'_>, multiplier: u64) -> OutputRow {
        let quantity = CellValue::Number(multiplier as f64);
        self.derive_row(
            order,
            CellValue::String(String::new()),
            CellValue::String(String::new()),
            quantity.clone(),
            quantity,
        )
    }

    fn derive_row(
        &self,
        order: &OrderRow<'_>,
        component_code: CellValue,
        seller_code: CellValue,
        ea_quantity: CellValue,
        original_quantity: CellValue,
    ) -> OutputRow {
        let layout = &self.layout;
        let mut cells = order.cells().to_vec();
        cells.resize(layout.width(), CellValue::Empty);

        cells[layout.component_code] = component_code;
        cells[layout.seller_code] = seller_code;
        cells[layout.ea_quantity] = ea_quantity;
        cells[layout.original_product_name] = order.raw_product_name().clone();
        cells[layout.original_purchase_quantity] = original_quantity;

        OutputRow {
            cells,
            component_column: layout.component_code,
        }
    }
}

/// EA数量 × 購入数量
///
/// 積が`MAX_EXACT_COUNT`を超える場合、出力セルでは正確に表せないため
/// 最も近い浮動小数点数になります。
fn ea_total(ea_quantity: u64, multiplier: u64) -> f64 {
    match ea_quantity.checked_mul(multiplier) {
        Some(total) if total <= MAX_EXACT_COUNT => total as f64,
        _ => {
            debug!(ea_quantity, multiplier, "EA total exceeds exact range, rounding");
            ea_quantity as f64 * multiplier as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderColumns;

    fn s(text: &str) -> CellValue {
        CellValue::String(text.to_string())
    }

    fn order_headers() -> Vec<String> {
        vec!["주문번호".to_string(), "상품명".to_string(), "구매 수량".to_string()]
    }

    fn columns() -> OrderColumns {
        OrderColumns::resolve(&order_headers()).unwrap()
    }

    #[test]
    fn test_layout_appends_derived_columns() {
        let layout = OutputLayout::new(&order_headers());

        assert_eq!(
            layout.headers(),
            &[
                "주문번호",
                "상품명",
                "구매 수량",
                COMPONENT_CODE_HEADER,
                SELLER_CODE_HEADER,
                EA_QUANTITY_HEADER,
                ORIGINAL_PRODUCT_NAME_HEADER,
                ORIGINAL_PURCHASE_QUANTITY_HEADER,
            ]
        );
        assert_eq!(layout.component_code_column(), 3);
        assert_eq!(layout.ea_quantity_column(), 5);
    }

    #[test]
    fn test_layout_reuses_existing_column() {
        let layout = OutputLayout::new(&["상품명", EA_QUANTITY_HEADER]);

        assert_eq!(layout.width(), 6);
        assert_eq!(layout.ea_quantity_column(), 1);
    }

    #[test]
    fn test_expand_one_row_per_component() {
        let expander = Expander::new(OutputLayout::new(&order_headers()));
        let cells = vec![s("O-1"), s("Profutura Pre Stage"), CellValue::Number(2.0)];
        let order = OrderRow::new(&cells, &columns());
        let components = vec![
            ComponentRule::new("C1", "S1", 1),
            ComponentRule::new("C2", "S2", 2),
        ];

        let rows = expander.expand(&order, &components, order.purchase_quantity());

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].cells(),
            &[
                s("O-1"),
                s("Profutura Pre Stage"),
                CellValue::Number(2.0),
                s("C1"),
                s("S1"),
                CellValue::Number(2.0),
                s("Profutura Pre Stage"),
                CellValue::Number(2.0),
            ]
        );
        assert_eq!(rows[1].component_code(), "C2");
        assert_eq!(rows[1].cells()[5], CellValue::Number(4.0));
        assert!(rows.iter().all(OutputRow::is_expanded));
    }

    #[test]
    fn test_expand_keeps_raw_quantity_cell() {
        let expander = Expander::new(OutputLayout::new(&order_headers()));
        let cells = vec![s("O-1"), s("Pronutra 1"), s("abc")];
        let order = OrderRow::new(&cells, &columns());

        let rows = expander.expand(&order, &[ComponentRule::new("C1", "S1", 3)], 1);

        assert_eq!(rows[0].cells()[5], CellValue::Number(3.0));
        assert_eq!(rows[0].cells()[7], s("abc"));
    }

    #[test]
    fn test_expand_without_quantity_column_uses_multiplier() {
        let headers = ["상품명"];
        let expander = Expander::new(OutputLayout::new(&headers));
        let columns = OrderColumns::resolve(&headers).unwrap();
        let cells = vec![s("Pronutra 2")];
        let order = OrderRow::new(&cells, &columns);

        let rows = expander.expand(&order, &[ComponentRule::new("C1", "S1", 2)], 1);

        assert_eq!(rows[0].cells().len(), 6);
        assert_eq!(rows[0].cells()[5], CellValue::Number(1.0));
    }

    #[test]
    fn test_expand_quantity_above_u32_range() {
        let expander = Expander::new(OutputLayout::new(&order_headers()));
        let cells = vec![s("O-1"), s("Profutura 1"), CellValue::Number(5e9)];
        let order = OrderRow::new(&cells, &columns());

        let rows = expander.expand(&order, &[ComponentRule::new("D1", "T1", 3)], order.purchase_quantity());

        assert_eq!(order.purchase_quantity(), 5_000_000_000);
        assert_eq!(rows[0].cells()[5], CellValue::Number(15_000_000_000.0));
        assert_eq!(rows[0].cells()[7], CellValue::Number(5e9));
    }

    #[test]
    fn test_ea_total_beyond_exact_range() {
        assert_eq!(ea_total(3, 4), 12.0);
        assert_eq!(ea_total(MAX_EXACT_COUNT, 1), MAX_EXACT_COUNT as f64);
        assert_eq!(ea_total(u64::MAX, 2), u64::MAX as f64 * 2.0);
    }

    #[test]
    fn test_expand_empty_components() {
        let expander = Expander::new(OutputLayout::new(&order_headers()));
        let cells = vec![s("O-1"), s("Pronutra 1"), CellValue::Number(1.0)];
        let order = OrderRow::new(&cells, &columns());

        assert!(expander.expand(&order, &[], 1).is_empty());
    }

    #[test]
    fn test_passthrough() {
        let expander = Expander::new(OutputLayout::new(&order_headers()));
        let cells = vec![s("O-2"), s("Unknown Widget"), s("3")];
        let order = OrderRow::new(&cells, &columns());

        let row = expander.passthrough(&order, order.purchase_quantity());

        assert_eq!(
            row.cells(),
            &[
                s("O-2"),
                s("Unknown Widget"),
                s("3"),
                s(""),
                s(""),
                CellValue::Number(3.0),
                s("Unknown Widget"),
                CellValue::Number(3.0),
            ]
        );
        assert_eq!(row.component_code(), "");
        assert!(!row.is_expanded());
    }
}
