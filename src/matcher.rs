//! Product Matcher Module
//!
//! 自由入力の商品名を分配規則のグループキーに対応付ける。
//!
//! 判定は優先順位つきの表（商品名の条件, グループキーの条件）で行います。
//! 上から順に商品名の条件を満たす行を試し、その行のキー条件を満たす最初の
//! グループキー（シート上の順序）を採用します。キーが見つからなければ次の行へ進みます。

use crate::rules::RuleTable;
use crate::types::ComponentRule;

/// 照合規則の1行
#[derive(Debug, Clone, Copy)]
pub struct MatchRule {
    /// ログに使う規則名
    pub name: &'static str,
    /// 大文字化した商品名に対する条件
    pub product: fn(&str) -> bool,
    /// 大文字化したグループキーに対する条件
    pub rule_key: fn(&str) -> bool,
}

/// 照合規則（優先順位順）
pub const MATCH_RULES: &[MatchRule] = &[
    MatchRule {
        name: "profutura-pre",
        product: |name| name.contains("PROFUTURA") && name.contains("PRE"),
        rule_key: |key| key.contains("3PF PRE") || key.contains("3PFPRE") || key.contains("PRE"),
    },
    MatchRule {
        name: "pronutra-1",
        product: |name| name.contains("PRONUTRA") && (name.contains('1') || name.contains("VP 1")),
        rule_key: |key| key.contains("3PN1+IF") || key.contains("3PN 1+IF"),
    },
    MatchRule {
        name: "pronutra-2",
        product: |name| name.contains("PRONUTRA") && (name.contains('2') || name.contains("VP 2")),
        rule_key: |key| key.contains("3PN2+FO") || key.contains("3PN 2+FO"),
    },
    MatchRule {
        name: "profutura-1",
        product: |name| name.contains("PROFUTURA") && name.contains('1') && !name.contains("PRE"),
        rule_key: |key| {
            (key.contains("3PF 1+IF") || key.contains("3PF1+IF")) && !key.contains("PRE")
        },
    },
    MatchRule {
        name: "profutura-2",
        product: |name| name.contains("PROFUTURA") && name.contains('2') && !name.contains("PRE"),
        rule_key: |key| {
            (key.contains("3PF 2+FO") || key.contains("3PF2+FO")) && !key.contains("PRE")
        },
    },
];

/// 照合結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    /// 採用した照合規則の名前
    pub rule: &'static str,
    /// 一致したグループキー
    pub key: &'a str,
    /// グループの構成品リスト
    pub components: &'a [ComponentRule],
}

/// 商品名を分配規則に照合する
///
/// 商品名が空白の場合や、どの規則にも一致しない場合は`None`を返します。
///
/// # 使用例
///
/// ```rust
/// use order_distributor::matcher::match_product;
/// use order_distributor::{ComponentRule, RuleTable};
///
/// let table = RuleTable::from_groups(vec![
///     ("3PF PRE+IF", vec![ComponentRule::new("C1", "S1", 1)]),
/// ]);
///
/// let matched = match_product("Profutura Pre Stage", &table).unwrap();
/// assert_eq!(matched.key, "3PF PRE+IF");
/// assert!(match_product("Unknown Widget", &table).is_none());
/// ```
pub fn match_product<'a>(product_name: &str, rules: &'a RuleTable) -> Option<RuleMatch<'a>> {
    let name = product_name.trim().to_uppercase();
    if name.is_empty() {
        return None;
    }

    MATCH_RULES
        .iter()
        .filter(|rule| (rule.product)(&name))
        .find_map(|rule| {
            rules
                .iter()
                .find(|(key, _)| (rule.rule_key)(&key.to_uppercase()))
                .map(|(key, components)| RuleMatch {
                    rule: rule.name,
                    key,
                    components,
                })
        })
}
