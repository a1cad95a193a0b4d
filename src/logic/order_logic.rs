//! 取り込んだ注文レコードの集計ロジック
//!
//! 呼び出し側（保存・表示層）が既存の注文一覧と新しく取得した注文を統合するための純粋関数。

use crate::parsers::{OrderRecord, Platform};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// マージ結果
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    /// 日付降順に並んだ統合後の一覧
    pub orders: Vec<OrderRecord>,
    /// 新規に追加された件数
    pub added_count: usize,
}

/// 既存一覧に新しい注文をマージする
///
/// 既存に同じ `id` があるレコードは追加しない（取得バッチ内の重複も1件にまとめる）。
/// 新規分を先頭に置いてから日付降順で安定ソートするため、同じ日付では新規分が先に来る。
pub fn merge_orders(existing: Vec<OrderRecord>, incoming: Vec<OrderRecord>) -> MergeResult {
    let mut seen: HashSet<String> = existing.iter().map(|o| o.id.clone()).collect();

    let new_orders: Vec<OrderRecord> = incoming
        .into_iter()
        .filter(|order| seen.insert(order.id.clone()))
        .collect();
    let added_count = new_orders.len();

    let mut orders = new_orders;
    orders.extend(existing);
    sort_by_date_desc(&mut orders);

    log::info!(
        "Merged {added_count} new order(s); collection now has {} order(s)",
        orders.len()
    );

    MergeResult {
        orders,
        added_count,
    }
}

/// 日付の新しい順に並べる（同日内の順序は保持）
pub fn sort_by_date_desc(orders: &mut [OrderRecord]) {
    orders.sort_by(|a, b| b.date.cmp(&a.date));
}

/// 期間とプラットフォームで絞り込み、日付降順で返す
///
/// # Arguments
/// * `start` / `end` - 両端を含む期間。None なら制限なし
/// * `platform` - None なら全プラットフォーム
pub fn filter_orders<'a>(
    orders: &'a [OrderRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    platform: Option<Platform>,
) -> Vec<&'a OrderRecord> {
    let mut filtered: Vec<&OrderRecord> = orders
        .iter()
        .filter(|o| start.map_or(true, |s| o.date >= s))
        .filter(|o| end.map_or(true, |e| o.date <= e))
        .filter(|o| platform.map_or(true, |p| o.platform == p))
        .collect();
    filtered.sort_by(|a, b| b.date.cmp(&a.date));
    filtered
}

/// プラットフォーム別の件数と合計金額
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTotals {
    pub swiggy_total: f64,
    pub swiggy_count: usize,
    pub zomato_total: f64,
    pub zomato_count: usize,
}

impl SpendingTotals {
    pub fn grand_total(&self) -> f64 {
        self.swiggy_total + self.zomato_total
    }

    pub fn order_count(&self) -> usize {
        self.swiggy_count + self.zomato_count
    }
}

/// 注文一覧をプラットフォーム別に集計する
pub fn summarize_spending<'a, I>(orders: I) -> SpendingTotals
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    orders
        .into_iter()
        .fold(SpendingTotals::default(), |mut totals, order| {
            match order.platform {
                Platform::Swiggy => {
                    totals.swiggy_total += order.amount;
                    totals.swiggy_count += 1;
                }
                Platform::Zomato => {
                    totals.zomato_total += order.amount;
                    totals.zomato_count += 1;
                }
            }
            totals
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, date: (i32, u32, u32), platform: Platform, amount: f64) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            platform,
            amount,
            description: format!("{platform} Order"),
            restaurant_name: Some(platform.label().to_string()),
            items: None,
            subject: String::new(),
        }
    }

    // ==================== merge_orders Tests ====================

    #[test]
    fn test_merge_skips_existing_ids() {
        let existing = vec![order("a", (2024, 1, 5), Platform::Swiggy, 100.0)];
        let incoming = vec![
            order("a", (2024, 1, 5), Platform::Swiggy, 100.0),
            order("b", (2024, 1, 7), Platform::Zomato, 250.0),
        ];

        let result = merge_orders(existing, incoming);

        assert_eq!(result.added_count, 1);
        let ids: Vec<_> = result.orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_merge_dedups_within_batch() {
        let incoming = vec![
            order("x", (2024, 2, 1), Platform::Zomato, 10.0),
            order("x", (2024, 2, 1), Platform::Zomato, 10.0),
        ];
        let result = merge_orders(vec![], incoming);
        assert_eq!(result.added_count, 1);
        assert_eq!(result.orders.len(), 1);
    }

    #[test]
    fn test_merge_sorts_by_date_desc_new_first_on_ties() {
        let existing = vec![
            order("old", (2024, 3, 1), Platform::Swiggy, 1.0),
            order("older", (2024, 1, 1), Platform::Swiggy, 1.0),
        ];
        let incoming = vec![
            order("same-day", (2024, 3, 1), Platform::Zomato, 1.0),
            order("mid", (2024, 2, 1), Platform::Zomato, 1.0),
        ];

        let result = merge_orders(existing, incoming);
        let ids: Vec<_> = result.orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["same-day", "old", "mid", "older"]);
    }

    #[test]
    fn test_merge_nothing_new() {
        let existing = vec![order("a", (2024, 1, 5), Platform::Swiggy, 100.0)];
        let result = merge_orders(existing.clone(), existing);
        assert_eq!(result.added_count, 0);
        assert_eq!(result.orders.len(), 1);
    }

    // ==================== filter_orders Tests ====================

    #[test]
    fn test_filter_by_range_and_platform() {
        let orders = vec![
            order("a", (2024, 1, 1), Platform::Swiggy, 1.0),
            order("b", (2024, 1, 15), Platform::Zomato, 1.0),
            order("c", (2024, 1, 31), Platform::Swiggy, 1.0),
            order("d", (2024, 2, 1), Platform::Swiggy, 1.0),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        let end = NaiveDate::from_ymd_opt(2024, 1, 31);

        let all: Vec<_> = filter_orders(&orders, start, end, None)
            .into_iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(all, vec!["c", "b", "a"]);

        let swiggy: Vec<_> = filter_orders(&orders, start, end, Some(Platform::Swiggy))
            .into_iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(swiggy, vec!["c", "a"]);
    }

    // ==================== summarize_spending Tests ====================

    #[test]
    fn test_summarize_spending() {
        let orders = vec![
            order("a", (2024, 1, 1), Platform::Swiggy, 120.5),
            order("b", (2024, 1, 2), Platform::Zomato, 300.0),
            order("c", (2024, 1, 3), Platform::Swiggy, 79.5),
        ];
        let totals = summarize_spending(&orders);
        assert_eq!(totals.swiggy_total, 200.0);
        assert_eq!(totals.swiggy_count, 2);
        assert_eq!(totals.zomato_total, 300.0);
        assert_eq!(totals.zomato_count, 1);
        assert_eq!(totals.grand_total(), 500.0);
        assert_eq!(totals.order_count(), 3);
    }

    #[test]
    fn test_summarize_empty() {
        let totals = summarize_spending(&[] as &[OrderRecord]);
        assert_eq!(totals, SpendingTotals::default());
    }
}
