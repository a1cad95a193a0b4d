//! 注文メールの抽出エンジン
//!
//! 生メッセージ1通から注文レコードを1件作る（または作らない）純粋関数。
//! I/O も共有状態も持たないため、複数メッセージに対して並行に呼び出してよい。
//!
//! 処理順序:
//! プラットフォーム判定 → 本文の平坦化 → 商品抽出 → 金額抽出（0 なら破棄）
//! → 店名・説明文の組み立て → 日付決定 → レコード生成

use crate::gmail::RawMessage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod amount;
pub mod body;
pub mod date;
pub mod items;
pub mod platform;
pub mod restaurant;
pub mod swiggy;
pub mod zomato;

pub use restaurant::OrderSummary;

/// フードデリバリーのプラットフォーム
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Swiggy,
    Zomato,
}

impl Platform {
    /// 表示用の名前（店名が取れない場合の代替名にも使う）
    pub fn label(self) -> &'static str {
        match self {
            Self::Swiggy => "Swiggy",
            Self::Zomato => "Zomato",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    /// "swiggy" / "zomato"（大文字小文字は無視）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swiggy" => Ok(Self::Swiggy),
            "zomato" => Ok(Self::Zomato),
            other => Err(format!("Unknown platform: {other}")),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// メール1通から抽出した注文レコード
///
/// 生成後は変更しない。`id` は元メッセージのIDで、重複排除のキーになる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    /// 注文日（Date ヘッダーの UTC 日付）
    pub date: NaiveDate,
    pub platform: Platform,
    /// 金額（INR）。常に 0 より大きい
    pub amount: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    /// 商品名（出現順・重複なし・最大15件）。見つからなければ None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    pub subject: String,
}

/// プラットフォームごとの差分（金額ルール表・店名の決め方）
pub trait FoodOrderParser: Send + Sync {
    fn platform(&self) -> Platform;

    /// 金額抽出ルール（評価順）
    fn amount_rules(&self) -> &'static [amount::CompiledAmountRule];

    /// 店名と説明文を決める
    fn summarize(&self, subject: &str, items: &[String], body: &str) -> OrderSummary;
}

/// プラットフォームから適切なパーサーを取得する
pub fn get_parser(platform: Platform) -> Box<dyn FoodOrderParser> {
    match platform {
        Platform::Swiggy => Box::new(swiggy::SwiggyParser),
        Platform::Zomato => Box::new(zomato::ZomatoParser),
    }
}

/// プラットフォームに応じて店名と説明文を決める
pub fn synthesize(platform: Platform, subject: &str, items: &[String], body: &str) -> OrderSummary {
    get_parser(platform).summarize(subject, items, body)
}

/// 生メッセージ1通を注文レコードに変換する
///
/// 送信元が対象外、または金額が取れない場合は None。
pub fn parse_order_email(message: &RawMessage) -> Option<OrderRecord> {
    let Some(platform) = platform::detect_platform(message.from_address()) else {
        log::debug!("Skipping message {}: not from a supported platform", message.id);
        return None;
    };
    let body = body::flatten_body(&message.payload);
    let items = items::extract_items(&body);

    let Some(amount) = amount::extract_amount(&body, platform) else {
        log::info!(
            "Skipping {} message {}: no amount found (body {} chars)",
            platform,
            message.id,
            body.len()
        );
        return None;
    };

    let subject = message.subject();
    let OrderSummary {
        restaurant_name,
        description,
    } = synthesize(platform, subject, &items, &body);

    let Some(date) = date::resolve_order_date(message.date_header(), message.internal_date) else {
        log::warn!("Skipping {} message {}: no usable date", platform, message.id);
        return None;
    };

    log::debug!(
        "Parsed {} order {}: amount={amount}, items={}",
        platform,
        message.id,
        items.len()
    );

    Some(OrderRecord {
        id: message.id.clone(),
        date,
        platform,
        amount,
        description,
        restaurant_name,
        items: if items.is_empty() { None } else { Some(items) },
        subject: subject.to_string(),
    })
}

/// 複数メッセージをまとめて変換し、注文でないものを除外する
pub fn extract_orders(messages: &[RawMessage]) -> Vec<OrderRecord> {
    let orders: Vec<OrderRecord> = messages.iter().filter_map(parse_order_email).collect();
    log::info!(
        "Extracted {} order(s) from {} message(s)",
        orders.len(),
        messages.len()
    );
    orders
}
