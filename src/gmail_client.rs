//! Gmail へのアクセスを差し替え可能にするトレイト
//!
//! 取得処理（`gmail::order_fetch`）はこのトレイト越しにのみ Gmail を呼ぶ。
//! 本番は `gmail::GmailClient`（REST）、テストは mockall のモックを渡す。

use crate::gmail::RawMessage;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GmailClientTrait: Send + Sync {
    /// 検索クエリにマッチするメッセージIDを1ページ分返す
    ///
    /// # Returns
    /// (メッセージID一覧, 次ページのトークン)。最終ページならトークンは None
    async fn list_message_ids(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<String>,
    ) -> Result<(Vec<String>, Option<String>), String>;

    /// MIME パートツリーを含む完全なメッセージを取得
    async fn get_message(&self, message_id: &str) -> Result<RawMessage, String>;
}
