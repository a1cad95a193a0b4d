//! Gmail API の `users.messages.get?format=full` レスポンスに対応する生メッセージ型
//!
//! 取得後は不変。本文（body.data）は API が返す base64url 文字列のまま保持し、
//! デコードはパーサー側（`parsers::body`）で行う。

use serde::{Deserialize, Serialize};

/// Gmail から取得した1通分の生メッセージ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Gmail のメッセージID（注文レコードの id にそのまま使う）
    pub id: String,
    /// 受信日時（ミリ秒単位のUnixタイムスタンプ）。API は文字列で返す
    #[serde(default, with = "internal_date_format")]
    pub internal_date: Option<i64>,
    /// MIME パートツリーのルート
    #[serde(default)]
    pub payload: MessagePart,
}

/// MIME パート
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<MessageBody>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

/// パート本文。data は base64 / base64url エンコード済みテキスト
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl MessagePart {
    /// インラインのエンコード済みデータを持っていればそれを返す
    pub fn encoded_data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }
}

impl RawMessage {
    /// トップレベルのヘッダーを名前で検索する（大文字小文字は無視）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// From ヘッダー（なければ空文字）
    pub fn from_address(&self) -> &str {
        self.header("From").unwrap_or_default()
    }

    /// Subject ヘッダー（なければ空文字）
    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or_default()
    }

    /// Date ヘッダー
    pub fn date_header(&self) -> Option<&str> {
        self.header("Date")
    }
}

/// `internalDate` は JSON 上 `"1704067200000"` のような文字列で届くため、
/// 文字列・数値の両方を受け付ける
mod internal_date_format {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Num(i64),
    }

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let raw = Option::<StringOrNumber>::deserialize(deserializer)?;
        Ok(match raw {
            Some(StringOrNumber::Str(s)) => s.trim().parse::<i64>().ok(),
            Some(StringOrNumber::Num(n)) => Some(n),
            None => None,
        })
    }
}
