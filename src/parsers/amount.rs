//! 本文から注文金額を抽出する
//!
//! プラットフォームごとの「ラベル + 通貨 + 金額」ルール表を先頭から順に評価し、
//! 最初にマッチしたルールの金額を採用する（first-match-wins）。
//! 後ろのルールほど汎用的なので、表の順序を入れ替えないこと。

use super::{get_parser, Platform};
use regex::Regex;

/// `<label>[:\s]+<通貨><金額>` 形式のパターン文字列を組み立てる
macro_rules! labeled_amount {
    ($label:literal) => {
        concat!(
            "(?i)",
            $label,
            r"[:\s]+(?:Rs\.?|₹|INR)\s*(\d[\d,]*(?:\.\d{2})?)"
        )
    };
}
pub(crate) use labeled_amount;

/// 通貨記号の直後の金額だけを拾う最終手段のパターン
pub const BARE_CURRENCY_AMOUNT: &str = r"(?:Rs\.?|₹|INR)\s*(\d[\d,]*(?:\.\d{2})?)";

/// 金額抽出ルール（ラベルと正規表現）。キャプチャグループ1が金額
#[derive(Debug, Clone, Copy)]
pub struct AmountRule {
    pub label: &'static str,
    pub pattern: &'static str,
}

/// コンパイル済みの金額抽出ルール
#[derive(Debug)]
pub struct CompiledAmountRule {
    pub label: &'static str,
    regex: Regex,
}

/// ルール表をコンパイルする（静的パターンなので失敗しない前提）
pub fn compile_rules(rules: &[AmountRule]) -> Vec<CompiledAmountRule> {
    rules
        .iter()
        .map(|rule| CompiledAmountRule {
            label: rule.label,
            regex: Regex::new(rule.pattern).unwrap_or_else(|e| {
                panic!("Invalid amount pattern '{}': {e}", rule.label)
            }),
        })
        .collect()
}

/// プラットフォームのルール表で金額を抽出する
///
/// どのルールにもマッチしない、または 0 以下の場合は None（注文として扱わない）。
pub fn extract_amount(body: &str, platform: Platform) -> Option<f64> {
    extract_amount_with_rules(body, get_parser(platform).amount_rules())
}

/// ルール表を先頭から評価し、最初にマッチしたルールの金額を返す
pub fn extract_amount_with_rules(body: &str, rules: &[CompiledAmountRule]) -> Option<f64> {
    let (rule, raw) = rules.iter().find_map(|rule| {
        rule.regex
            .captures(body)
            .and_then(|cap| cap.get(1))
            .map(|m| (rule, m.as_str()))
    })?;

    let amount = parse_amount(raw)?;
    log::debug!("Amount matched by rule '{}': {amount}", rule.label);

    if amount > 0.0 {
        Some(amount)
    } else {
        None
    }
}

/// "1,234.50" → 1234.5（桁区切りのカンマを除去してパース）
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_RULES: &[AmountRule] = &[
        AmountRule {
            label: "Total",
            pattern: labeled_amount!("Total"),
        },
        AmountRule {
            label: "Grand Total",
            pattern: labeled_amount!("Grand Total"),
        },
        AmountRule {
            label: "Currency",
            pattern: BARE_CURRENCY_AMOUNT,
        },
    ];

    #[test]
    fn test_labeled_amount_pattern_text() {
        assert_eq!(
            labeled_amount!("To Pay"),
            r"(?i)To Pay[:\s]+(?:Rs\.?|₹|INR)\s*(\d[\d,]*(?:\.\d{2})?)"
        );
    }

    #[test]
    fn test_first_match_wins() {
        let rules = compile_rules(TEST_RULES);
        let body = "Total: Rs. 250\nGrand Total: Rs. 300";
        assert_eq!(extract_amount_with_rules(body, &rules), Some(250.0));
    }

    #[test]
    fn test_currency_variants() {
        let rules = compile_rules(TEST_RULES);
        assert_eq!(extract_amount_with_rules("TOTAL ₹1,299.50", &rules), Some(1299.5));
        assert_eq!(extract_amount_with_rules("total: INR 99", &rules), Some(99.0));
        assert_eq!(extract_amount_with_rules("Total: Rs 45.00", &rules), Some(45.0));
    }

    #[test]
    fn test_falls_through_to_last_resort() {
        let rules = compile_rules(TEST_RULES);
        assert_eq!(extract_amount_with_rules("Paid Rs. 75 via UPI", &rules), Some(75.0));
    }

    #[test]
    fn test_no_match_returns_none() {
        let rules = compile_rules(TEST_RULES);
        assert_eq!(extract_amount_with_rules("Thanks for ordering!", &rules), None);
        assert_eq!(extract_amount_with_rules("", &rules), None);
    }

    #[test]
    fn test_zero_amount_is_not_found() {
        let rules = compile_rules(TEST_RULES);
        assert_eq!(extract_amount_with_rules("Total: Rs. 0\nRs. 500", &rules), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,23,456.78"), Some(123456.78));
        assert_eq!(parse_amount("620"), Some(620.0));
        assert_eq!(parse_amount("abc"), None);
    }
}
