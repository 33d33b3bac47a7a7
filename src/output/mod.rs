//! Output Module
//!
//! 分配結果の表と、XLSXファイルへの書き出しを提供するモジュール。

mod writer;

use crate::expander::{OutputLayout, OutputRow};

pub use writer::{ShadingWriter, DEFAULT_SHADE_COLOR};

/// 分配結果の表
///
/// 出力の列構成と、入力の順序で並んだ出力行を保持します。
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    layout: OutputLayout,
    rows: Vec<OutputRow>,
}

impl OutputTable {
    /// 空の表を生成
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            rows: Vec::new(),
        }
    }

    /// 行を末尾に追加
    pub fn extend<I: IntoIterator<Item = OutputRow>>(&mut self, rows: I) {
        self.rows.extend(rows);
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// 展開によって生成された行（網掛け対象）の数
    pub fn expanded_row_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_expanded()).count()
    }
}
