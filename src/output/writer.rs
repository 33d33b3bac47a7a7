//! XLSX Writer
//!
//! rust_xlsxwriterを使用して分配結果を1シートのワークブックに書き出します。
//! ヘッダー行と展開行は網掛けされます。

use rust_xlsxwriter::{Color, ColNum, Format, FormatPattern, RowNum, Workbook, Worksheet, XlsxError};
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::OutputTable;
use crate::error::DistributorError;
use crate::types::CellValue;

/// 既定の網掛け色（薄い灰色）
pub const DEFAULT_SHADE_COLOR: u32 = 0xE0E0E0;

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// 網掛けつきのXLSXライター
#[derive(Debug, Clone)]
pub struct ShadingWriter {
    sheet_name: String,
    shade_color: u32,
}

/// セルの種類ごとに使い分ける書式
struct CellFormats {
    plain: Format,
    datetime: Format,
    shaded: Format,
    shaded_datetime: Format,
}

impl CellFormats {
    fn new(shade_color: u32) -> Self {
        let shade = |format: Format| {
            format
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(shade_color))
        };

        Self {
            plain: Format::new(),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
            shaded: shade(Format::new()),
            shaded_datetime: shade(Format::new().set_num_format(DATETIME_FORMAT)),
        }
    }
}

impl ShadingWriter {
    /// シート名と網掛け色（`0xRRGGBB`）を指定してライターを生成
    pub fn new(sheet_name: impl Into<String>, shade_color: u32) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            shade_color,
        }
    }

    /// 分配結果からワークブックを生成する
    ///
    /// # 書式
    ///
    /// * ヘッダー行は常に網掛け
    /// * 構成商品コードが空白でない行は、空セルも含めて行全体を網掛け
    /// * それ以外の行は網掛けなし
    /// * 列幅は内容に合わせて自動調整
    pub fn to_workbook(&self, table: &OutputTable) -> Result<Workbook, DistributorError> {
        let formats = CellFormats::new(self.shade_color);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (col, header) in table.layout().headers().iter().enumerate() {
            worksheet.write_string_with_format(0, col_num(col)?, header, &formats.shaded)?;
        }

        for (index, row) in table.rows().iter().enumerate() {
            let row_num = row_num(index + 1)?;
            let shaded = row.is_expanded();

            for (col, cell) in row.cells().iter().enumerate() {
                write_cell(worksheet, row_num, col_num(col)?, cell, shaded, &formats)?;
            }
        }

        worksheet.autofit();
        Ok(workbook)
    }

    /// 分配結果をXLSX形式でライターに書き出す
    pub fn write<W: Write>(&self, table: &OutputTable, mut writer: W) -> Result<(), DistributorError> {
        let mut workbook = self.to_workbook(table)?;
        let buffer = workbook.save_to_buffer()?;
        writer.write_all(&buffer)?;
        writer.flush()?;
        Ok(())
    }

    /// 分配結果をXLSXファイルとして保存する
    pub fn save(&self, table: &OutputTable, path: &Path) -> Result<(), DistributorError> {
        let mut workbook = self.to_workbook(table)?;
        workbook.save(path)?;

        info!(
            path = %path.display(),
            rows = table.rows().len(),
            shaded = table.expanded_row_count(),
            "output workbook written"
        );
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    cell: &CellValue,
    shaded: bool,
    formats: &CellFormats,
) -> Result<(), XlsxError> {
    let (format, datetime) = if shaded {
        (&formats.shaded, &formats.shaded_datetime)
    } else {
        (&formats.plain, &formats.datetime)
    };

    match cell {
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::DateTime(serial) => {
            worksheet.write_number_with_format(row, col, *serial, datetime)?;
        }
        CellValue::String(s) | CellValue::Error(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        CellValue::Empty if shaded => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}

fn row_num(index: usize) -> Result<RowNum, XlsxError> {
    RowNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(index: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}
