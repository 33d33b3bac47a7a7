//! Parser Module
//!
//! calamineを使用した注文ファイル・分配規則ファイルの読み込み。
//! 先頭シートのヘッダー行とデータ行を`SheetTable`として取り出します。

mod workbook;

pub(crate) use workbook::{load_table, WorkbookParser};
