//! Swiggy（Instamart を含む）注文メール用パーサー
//!
//! 送信元: noreply@swiggy.in / orders@swiggy.in

use super::amount::{compile_rules, labeled_amount, AmountRule, CompiledAmountRule, BARE_CURRENCY_AMOUNT};
use super::restaurant::{summarize_order, OrderSummary};
use super::{FoodOrderParser, Platform};
use once_cell::sync::Lazy;

/// Swiggy の金額抽出ルール（上から順に評価）
pub const SWIGGY_AMOUNT_RULES: &[AmountRule] = &[
    AmountRule {
        label: "Total",
        pattern: labeled_amount!("Total"),
    },
    AmountRule {
        label: "Grand Total",
        pattern: labeled_amount!("Grand Total"),
    },
    AmountRule {
        label: "Amount Paid",
        pattern: labeled_amount!("Amount Paid"),
    },
    AmountRule {
        label: "Bill",
        pattern: labeled_amount!("Bill"),
    },
    AmountRule {
        label: "Paid suffix",
        pattern: r"(?i)(?:Rs\.?|₹|INR)\s*(\d[\d,]*(?:\.\d{2})?)\s*paid",
    },
    AmountRule {
        label: "To Pay",
        pattern: labeled_amount!("To Pay"),
    },
    AmountRule {
        label: "Item total",
        pattern: labeled_amount!("Item total"),
    },
    AmountRule {
        label: "You paid",
        pattern: labeled_amount!("You paid"),
    },
    AmountRule {
        label: "Order Value",
        pattern: labeled_amount!("Order Value"),
    },
    AmountRule {
        label: "Currency amount",
        pattern: BARE_CURRENCY_AMOUNT,
    },
];

static COMPILED_RULES: Lazy<Vec<CompiledAmountRule>> =
    Lazy::new(|| compile_rules(SWIGGY_AMOUNT_RULES));

const INSTAMART_NAME: &str = "Swiggy Instamart";

pub struct SwiggyParser;

impl FoodOrderParser for SwiggyParser {
    fn platform(&self) -> Platform {
        Platform::Swiggy
    }

    fn amount_rules(&self) -> &'static [CompiledAmountRule] {
        &COMPILED_RULES
    }

    /// 件名に "instamart" を含む場合は本文の店名より優先して Instamart 扱いにする
    fn summarize(&self, subject: &str, items: &[String], body: &str) -> OrderSummary {
        if subject.to_lowercase().contains("instamart") {
            let description = if items.is_empty() {
                "Instamart Order".to_string()
            } else {
                items.join(", ")
            };
            return OrderSummary {
                restaurant_name: Some(INSTAMART_NAME.to_string()),
                description,
            };
        }

        summarize_order(self.platform().label(), items, body)
    }
}
