//! 本文から商品名（注文した料理）を抽出する
//!
//! 3つの戦略を固定順で試し、1件以上取れた最初の戦略の結果を採用する。
//! 1. 見出しセル（"Item Name" 等）に続くテーブルセルの走査
//! 2. 特定テンプレートのスタイル付きセル（width 50% / font-size 15px）
//! 3. 汎用フォールバック（大文字始まりのセル → 数量・通貨記号付きの行）

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// 最終的に返す商品数の上限
pub const MAX_ITEMS: usize = 15;

/// 見出しセル走査で集める候補数の上限
const MAX_TABLE_CANDIDATES: usize = 20;

/// 候補として受け付ける文字数（3〜99文字）
const MIN_ITEM_CHARS: usize = 3;
const MAX_ITEM_CHARS: usize = 99;

/// 商品リストの見出しとして扱うセル文字列
const ITEM_HEADER_LABELS: &[&str] = &["item name", "items", "item", "dish name"];

/// 商品名ではない語（見出し・税・手数料・合計・割引・チップ）
///
/// 完全一致または部分一致で除外する。部分一致なので "fee" は "Cold Coffee" も
/// 弾いてしまうが、手数料行を確実に落とす方を優先している。
const ITEM_SKIP_WORDS: &[&str] = &[
    "item name",
    "dish name",
    "item",
    "quantity",
    "qty",
    "price",
    "item total",
    "subtotal",
    "grand total",
    "total",
    "delivery",
    "discount",
    "tax",
    "gst",
    "cgst",
    "sgst",
    "charges",
    "fee",
    "bill",
    "packaging",
    "platform",
    "delivery tip",
    "coupon",
];

/// フォールバック戦略でのみ追加で除外する語
const FALLBACK_EXTRA_SKIP_WORDS: &[&str] = &["order", "amount", "grand"];

static HEADER_CELL_RE: Lazy<Regex> = Lazy::new(|| {
    let labels = ITEM_HEADER_LABELS
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?is)<t[dh]\b[^>]*>\s*(?:<[^>]+>\s*)*(?:{labels})\s*(?:<[^>]+>\s*)*</t[dh]\s*>"
    ))
    .expect("item header regex must compile")
});

static TABLE_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</table\s*>").expect("table close regex must compile"));

static TABLE_CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").expect("table cell regex must compile")
});

static STYLED_CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<td\s+width=['"]50%['"]\s+style=['"]font-size:\s*15px['"]>([^<]+)</td>"#)
        .expect("styled cell regex must compile")
});

static CAPITALIZED_CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:<td[^>]*>)([A-Z][A-Za-z\s&',.-]{3,50}?)(?i:</td>)")
        .expect("capitalized cell regex must compile")
});

static PRICED_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|\n)\s*(?:\d+\s*x\s*)?([A-Z][A-Za-z\s&',.-]+?)(?:\s+x\s*\d+|\s*₹|\s*Rs\.?)")
        .expect("priced line regex must compile")
});

static NUMERIC_LIKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[\d.,₹\s]|(?i:rs|inr))+$").expect("numeric-like regex must compile")
});

/// 抽出戦略（名前と関数）。配列の順序がそのまま優先順位になる
type ItemStrategy = (&'static str, fn(&str) -> Vec<String>);

const ITEM_STRATEGIES: &[ItemStrategy] = &[
    ("header_table", extract_from_header_table),
    ("styled_cell", extract_from_styled_cells),
    ("fallback", extract_with_fallback),
];

/// 本文から商品名リストを抽出する
///
/// 重複は最初に出現した順で除去し、最大 [`MAX_ITEMS`] 件に切り詰める。
pub fn extract_items(body: &str) -> Vec<String> {
    for (name, strategy) in ITEM_STRATEGIES {
        let candidates = strategy(body);
        if !candidates.is_empty() {
            log::debug!(
                "Item strategy '{}' matched {} candidate(s)",
                name,
                candidates.len()
            );
            return dedup_and_cap(candidates);
        }
    }
    Vec::new()
}

fn dedup_and_cap(candidates: Vec<String>) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for candidate in candidates {
        if !items.contains(&candidate) {
            items.push(candidate);
        }
    }
    items.truncate(MAX_ITEMS);
    items
}

/// 戦略1: 見出しセルの直後から `</table>` までのセルを順に走査する
fn extract_from_header_table(body: &str) -> Vec<String> {
    let Some(header) = HEADER_CELL_RE.find(body) else {
        return Vec::new();
    };

    let rest = &body[header.end()..];
    let region = match TABLE_CLOSE_RE.find(rest) {
        Some(close) => &rest[..close.start()],
        None => rest,
    };

    let mut candidates = Vec::new();
    for cap in TABLE_CELL_RE.captures_iter(region) {
        if candidates.len() >= MAX_TABLE_CANDIDATES {
            break;
        }
        let Some(inner) = cap.get(1) else { continue };
        let text = html_text(inner.as_str());
        if is_acceptable_length(&text)
            && !is_numeric_like(&text)
            && !contains_skip_word(&text, ITEM_SKIP_WORDS)
        {
            candidates.push(text);
        }
    }
    candidates
}

/// 戦略2: `<td width='50%' style='font-size: 15px'>` 形式のセル
fn extract_from_styled_cells(body: &str) -> Vec<String> {
    STYLED_CELL_RE
        .captures_iter(body)
        .filter_map(|cap| cap.get(1).map(|m| html_text(m.as_str())))
        .filter(|text| is_acceptable_length(text) && !contains_skip_word(text, ITEM_SKIP_WORDS))
        .collect()
}

/// 戦略3: 汎用パターンを順に試し、候補が取れた時点で打ち切る
fn extract_with_fallback(body: &str) -> Vec<String> {
    for pattern in [&*CAPITALIZED_CELL_RE, &*PRICED_LINE_RE] {
        let candidates: Vec<String> = pattern
            .captures_iter(body)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
            .filter(|text| {
                is_acceptable_length(text)
                    && !is_numeric_like(text)
                    && !contains_skip_word(text, ITEM_SKIP_WORDS)
                    && !contains_skip_word(text, FALLBACK_EXTRA_SKIP_WORDS)
            })
            .collect();
        if !candidates.is_empty() {
            return candidates;
        }
    }
    Vec::new()
}

/// セル内の HTML 断片からテキストだけを取り出す（タグ除去・実体参照デコード・空白正規化）
///
/// 前後の空白除去に加えて、内部の連続空白・改行も1つの空白にまとめる。
fn html_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_acceptable_length(text: &str) -> bool {
    let len = text.chars().count();
    (MIN_ITEM_CHARS..=MAX_ITEM_CHARS).contains(&len)
}

/// 数字・通貨記号・区切り文字・空白・"Rs" だけで構成されているか
fn is_numeric_like(text: &str) -> bool {
    NUMERIC_LIKE_RE.is_match(text)
}

fn contains_skip_word(text: &str, skip_words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    skip_words
        .iter()
        .any(|word| lower == *word || lower.contains(word))
}
