//! 店舗名と表示用の説明文を組み立てる

use once_cell::sync::Lazy;
use regex::Regex;

/// 説明文に含める商品数
const DESCRIPTION_ITEM_COUNT: usize = 3;

/// "from <店名>" / "at <店名>"。店名は区切り（, ( - 改行 <）の直前まで
static RESTAURANT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:from|at)\s+([A-Z][A-Za-z\s&',.-]{2,50}?)(?:\s*,|\s*\(|\s*-|\n|<)")
        .expect("Failed to compile restaurant regex pattern - this is a static pattern and should never fail")
});

/// 店舗名と説明文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub restaurant_name: Option<String>,
    pub description: String,
}

/// 本文から "from/at <店名>" を探す
pub fn find_restaurant_name(body: &str) -> Option<String> {
    RESTAURANT_RE
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// 店名が取れればそれを、取れなければプラットフォーム名を使って説明文を組み立てる
///
/// * `platform_label` - 店名が見つからない場合の代替名（"Swiggy" など）
pub fn summarize_order(platform_label: &str, items: &[String], body: &str) -> OrderSummary {
    if let Some(name) = find_restaurant_name(body) {
        let description = if items.is_empty() {
            format!("Order from {name}")
        } else {
            format!("{name}: {}", leading_items(items))
        };
        return OrderSummary {
            restaurant_name: Some(name),
            description,
        };
    }

    let description = if items.is_empty() {
        format!("{platform_label} Order")
    } else {
        items
            .iter()
            .take(DESCRIPTION_ITEM_COUNT)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    OrderSummary {
        restaurant_name: Some(platform_label.to_string()),
        description,
    }
}

/// 先頭3件を ", " 区切りで連結し、4件以上なら "..." を付ける
fn leading_items(items: &[String]) -> String {
    let head = items
        .iter()
        .take(DESCRIPTION_ITEM_COUNT)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > DESCRIPTION_ITEM_COUNT {
        format!("{head}...")
    } else {
        head
    }
}
