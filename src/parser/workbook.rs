//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックの先頭シートを表として読み込みます。

use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info};

use crate::error::DistributorError;
use crate::types::{CellValue, SheetTable};

/// ワークブックパーサー
///
/// 入力をすべてメモリに読み込んでからcalamineで開きます。
/// calamineが自動判別できる形式（xlsx / xlsm / xls / ods）に対応します。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - ファイルを読み込むためのリーダー
    /// * `max_input_file_size` - 入力サイズの上限（バイト）
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(DistributorError::SecurityViolation)` - サイズ上限を超えた場合
    /// * `Err(DistributorError::Parse)` - ワークブックとして解析できない場合
    pub fn open<R: Read + Seek>(
        mut reader: R,
        max_input_file_size: u64,
    ) -> Result<Self, DistributorError> {
        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;

        if bytes_read as u64 > max_input_file_size {
            return Err(DistributorError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, max_input_file_size
            )));
        }

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// 先頭シートを表として読み込む
    ///
    /// 1行目をヘッダー、2行目以降をデータ行とします。
    /// ヘッダー行は前後の空白を除去し、データ行はヘッダーの列数にそろえます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(SheetTable)` - 読み込んだ表
    /// * `Err(DistributorError::EmptyWorkbook)` - シートがない、またはシートが空の場合
    pub fn first_sheet_table(&mut self) -> Result<SheetTable, DistributorError> {
        let range = self
            .workbook
            .worksheet_range_at(0)
            .ok_or(DistributorError::EmptyWorkbook)??;

        let mut rows = range.rows();
        let header_row = rows.next().ok_or(DistributorError::EmptyWorkbook)?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| CellValue::from(cell).as_raw_string().trim().to_string())
            .collect();

        let data: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();

        let sheet = self.sheet_names().into_iter().next().unwrap_or_default();
        debug!(sheet = %sheet, columns = headers.len(), rows = data.len(), "parsed first worksheet");
        Ok(SheetTable::new(headers, data))
    }
}

/// パスからファイルを開き、先頭シートを表として読み込む
///
/// `role`はログに使うファイルの役割（`order` / `rules`）です。
/// ファイルの存在確認は呼び出し側（`Distributor::run`）で行います。
pub(crate) fn load_table(
    path: &Path,
    role: &str,
    max_input_file_size: u64,
) -> Result<SheetTable, DistributorError> {
    let file = File::open(path)?;
    let mut parser = WorkbookParser::open(file, max_input_file_size)?;
    let table = parser.first_sheet_table()?;

    info!(
        role,
        path = %path.display(),
        columns = ?table.headers,
        rows = table.rows.len(),
        "loaded worksheet"
    );
    Ok(table)
}
