//! Zomato 注文メール用パーサー
//!
//! 送信元: no-reply@zomato.com / order@zomato.com

use super::amount::{compile_rules, labeled_amount, AmountRule, CompiledAmountRule, BARE_CURRENCY_AMOUNT};
use super::restaurant::{summarize_order, OrderSummary};
use super::{FoodOrderParser, Platform};
use once_cell::sync::Lazy;

/// Zomato の金額抽出ルール（上から順に評価）
///
/// Swiggy と違い "Bill Amount" を持ち、金額の後ろが "paid" または "total" の形式も拾う。
pub const ZOMATO_AMOUNT_RULES: &[AmountRule] = &[
    AmountRule {
        label: "Total",
        pattern: labeled_amount!("Total"),
    },
    AmountRule {
        label: "Grand Total",
        pattern: labeled_amount!("Grand Total"),
    },
    AmountRule {
        label: "Bill Amount",
        pattern: labeled_amount!("Bill Amount"),
    },
    AmountRule {
        label: "Bill",
        pattern: labeled_amount!("Bill"),
    },
    AmountRule {
        label: "Paid/total suffix",
        pattern: r"(?i)(?:Rs\.?|₹|INR)\s*(\d[\d,]*(?:\.\d{2})?)\s*(?:paid|total)",
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
    Lazy::new(|| compile_rules(ZOMATO_AMOUNT_RULES));

pub struct ZomatoParser;

impl FoodOrderParser for ZomatoParser {
    fn platform(&self) -> Platform {
        Platform::Zomato
    }

    fn amount_rules(&self) -> &'static [CompiledAmountRule] {
        &COMPILED_RULES
    }

    fn summarize(&self, _subject: &str, items: &[String], body: &str) -> OrderSummary {
        summarize_order(self.platform().label(), items, body)
    }
}
