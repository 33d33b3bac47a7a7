//! Header Resolution Module
//!
//! 列名が固定されていないシートから、部分文字列の手がかりで列を特定する。

/// 部分文字列の一致方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Needle {
    /// 大文字小文字を区別して一致
    Exact(&'static str),
    /// 大文字小文字を区別せずに一致
    AnyCase(&'static str),
}

impl Needle {
    fn found_in(&self, header: &str) -> bool {
        match self {
            Needle::Exact(needle) => header.contains(needle),
            Needle::AnyCase(needle) => header.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

/// 列の手がかり
///
/// `alternatives`のいずれかが成立すればよく、各候補は含まれる部分文字列すべてが
/// ヘッダーに含まれている必要があります（OR of AND）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMarker {
    /// エラーメッセージやログに使う列の説明
    pub label: &'static str,
    /// 候補（OR）
    pub alternatives: &'static [&'static [Needle]],
}

impl ColumnMarker {
    /// ヘッダー文字列が手がかりに一致するか判定
    pub fn matches(&self, header: &str) -> bool {
        self.alternatives
            .iter()
            .any(|all_of| all_of.iter().all(|needle| needle.found_in(header)))
    }
}

/// 列探索の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLookup {
    /// 見つかった列のインデックス（0始まり）
    Found(usize),
    /// 一致するヘッダーがない
    NotFound,
}

impl ColumnLookup {
    /// `Option<usize>`に変換
    pub fn index(self) -> Option<usize> {
        match self {
            ColumnLookup::Found(index) => Some(index),
            ColumnLookup::NotFound => None,
        }
    }
}

/// ヘッダー行から手がかりに一致する最初の列を探す
///
/// 左から順に調べ、最初に一致した列を返します。
///
/// # 使用例
///
/// ```rust
/// use order_distributor::header::{resolve, ColumnLookup, PRODUCT_NAME};
///
/// let headers = vec!["주문번호".to_string(), "Commodity Name".to_string()];
/// assert_eq!(resolve(&headers, &PRODUCT_NAME), ColumnLookup::Found(1));
/// ```
pub fn resolve<S: AsRef<str>>(headers: &[S], marker: &ColumnMarker) -> ColumnLookup {
    headers
        .iter()
        .position(|header| marker.matches(header.as_ref()))
        .map_or(ColumnLookup::NotFound, ColumnLookup::Found)
}

/// 分配規則: 出庫（合包装）グループキー列
pub const GROUP_KEY: ColumnMarker = ColumnMarker {
    label: "group key",
    alternatives: &[
        &[Needle::Exact("출고")],
        &[Needle::Exact("합포장")],
        &[Needle::AnyCase("BOX")],
    ],
};

/// 分配規則: 構成商品コード列
pub const COMPONENT_CODE: ColumnMarker = ColumnMarker {
    label: "component code",
    alternatives: &[&[
        Needle::Exact("구성"),
        Needle::Exact("상품"),
        Needle::Exact("코드"),
    ]],
};

/// 分配規則: トップセラーコード列
pub const SELLER_CODE: ColumnMarker = ColumnMarker {
    label: "seller code",
    alternatives: &[&[Needle::Exact("탑셀러")], &[Needle::AnyCase("seller")]],
};

/// 分配規則: EA数量列
pub const EA_QUANTITY: ColumnMarker = ColumnMarker {
    label: "EA quantity",
    alternatives: &[&[Needle::Exact("EA"), Needle::Exact("수량")]],
};

/// 注文: 商品名列
pub const PRODUCT_NAME: ColumnMarker = ColumnMarker {
    label: "product name",
    alternatives: &[&[Needle::Exact("상품명")], &[Needle::Exact("Commodity")]],
};

/// 注文: 購入数量列
pub const PURCHASE_QUANTITY: ColumnMarker = ColumnMarker {
    label: "purchase quantity",
    alternatives: &[&[Needle::Exact("구매 수량")], &[Needle::Exact("Quantity")]],
};
