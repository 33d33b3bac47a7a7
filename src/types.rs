//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 日時（Excelシリアル値）
    DateTime(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が実質的に空白かどうかを判定
    ///
    /// 空セルのほか、前後の空白を除いた文字列が空、または`nan`・`none`
    /// （大文字小文字を区別しない）の場合も空白として扱います。
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) | CellValue::DateTime(n) => n.is_nan(),
            _ => {
                let text = self.as_raw_string();
                let trimmed = text.trim();
                trimmed.is_empty()
                    || trimmed.eq_ignore_ascii_case("nan")
                    || trimmed.eq_ignore_ascii_case("none")
            }
        }
    }

    /// 値を文字列として取得
    ///
    /// 小数部のない数値は小数点なしで出力します（`12345.0` → `"12345"`）。
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Number(n) | CellValue::DateTime(n) => format_number(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }

    /// 空白でなければ、前後の空白を除いた文字列を返す
    pub fn as_trimmed_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.as_raw_string().trim().to_string())
        }
    }
}

impl From<&calamine::Data> for CellValue {
    fn from(cell: &calamine::Data) -> Self {
        use calamine::Data;

        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::String(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
            Data::Error(e) => CellValue::Error(format!("{:?}", e)),
            Data::Empty => CellValue::Empty,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 組み合わせ商品を分配したときに生成される1つの構成品
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRule {
    /// 構成商品コード
    pub component_code: String,
    /// 構成商品のトップセラーコード
    pub seller_code: String,
    /// 組み合わせ商品1個あたりの個数（EA）
    pub ea_quantity: u64,
}

impl ComponentRule {
    /// 新しい構成品を生成
    pub fn new(component_code: impl Into<String>, seller_code: impl Into<String>, ea_quantity: u64) -> Self {
        Self {
            component_code: component_code.into(),
            seller_code: seller_code.into(),
            ea_quantity,
        }
    }
}

/// シートから読み込んだ表（ヘッダー行 + データ行）
///
/// すべてのデータ行はヘッダーと同じ列数にそろえられています。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    /// ヘッダー行（前後の空白を除去済み）
    pub headers: Vec<String>,
    /// データ行
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    /// ヘッダーとデータ行から表を生成
    ///
    /// 各行はヘッダーの列数に合わせて切り詰め、または空セルで補完されます。
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::String("   ".to_string()).is_blank());
        assert!(CellValue::String("nan".to_string()).is_blank());
        assert!(CellValue::String("None".to_string()).is_blank());
        assert!(CellValue::Number(f64::NAN).is_blank());

        assert!(!CellValue::String("3PF PRE+IF".to_string()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Bool(false).is_blank());
    }

    #[test]
    fn test_cell_value_raw_string() {
        assert_eq!(CellValue::Number(12345.0).as_raw_string(), "12345");
        assert_eq!(CellValue::Number(2.5).as_raw_string(), "2.5");
        assert_eq!(CellValue::Number(-3.0).as_raw_string(), "-3");
        assert_eq!(CellValue::Bool(true).as_raw_string(), "true");
        assert_eq!(CellValue::Empty.as_raw_string(), "");
    }

    #[test]
    fn test_cell_value_trimmed_text() {
        assert_eq!(
            CellValue::String("  C-100 ".to_string()).as_trimmed_text(),
            Some("C-100".to_string())
        );
        assert_eq!(CellValue::String(" NaN ".to_string()).as_trimmed_text(), None);
        assert_eq!(CellValue::Empty.as_trimmed_text(), None);
    }

    #[test]
    fn test_from_calamine_data() {
        use calamine::Data;

        assert_eq!(CellValue::from(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(CellValue::from(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(
            CellValue::from(&Data::String("x".to_string())),
            CellValue::String("x".to_string())
        );
        assert_eq!(CellValue::from(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_sheet_table_pads_rows() {
        let table = SheetTable::new(
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![
                vec![CellValue::Number(1.0)],
                vec![
                    CellValue::Number(1.0),
                    CellValue::Number(2.0),
                    CellValue::Number(3.0),
                    CellValue::Number(4.0),
                ],
            ],
        );

        assert_eq!(table.width(), 3);
        assert!(table.rows.iter().all(|row| row.len() == 3));
        assert_eq!(table.rows[0][2], CellValue::Empty);
    }
}
