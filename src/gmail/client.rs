//! Gmail REST API クライアント
//!
//! # セキュリティガイドライン
//! このモジュールはユーザーのメールデータを扱うため、以下のルールを厳守してください：
//!
//! - **機密情報のログ出力禁止**: アクセストークン、メール本文、件名、送信者情報をログに出力しないこと
//! - **メトリクスのみ**: ログに出力できるのは件数、文字数、メッセージIDなどの情報のみ
//!
//! アクセストークンの取得・更新は呼び出し側の責務。ここでは Bearer トークンとして付与するだけ。

use super::RawMessage;
use crate::gmail_client::GmailClientTrait;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Gmail API のベースURL
pub const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// リクエストタイムアウト（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// messages.list のレスポンス
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessagesResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

/// Google API のエラーレスポンス
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct GmailClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GmailClient {
    /// 本番の Gmail API に接続するクライアントを作成
    ///
    /// # セキュリティ
    /// アクセストークンはログに出力されません
    pub fn new(access_token: &str) -> Result<Self, String> {
        Self::with_base_url(
            access_token,
            DEFAULT_API_BASE_URL,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// 接続先とタイムアウトを指定してクライアントを作成（テスト・プロキシ用）
    pub fn with_base_url(
        access_token: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, String> {
        if access_token.trim().is_empty() {
            return Err("Gmail access token is empty".to_string());
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {e}"))?;

        log::info!("GmailClient created (timeout: {}s)", timeout.as_secs());

        Ok(Self {
            http_client,
            access_token: access_token.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/users/me/messages", self.base_url)
    }

    /// 成功以外のステータスを、API のエラーメッセージ付きの Err に変換する
    async fn error_from_response(context: &str, response: reqwest::Response) -> String {
        let status = response.status();
        let detail = response
            .json::<ApiErrorResponse>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_default();

        log::error!("{context} failed with status {status}");

        match status {
            StatusCode::UNAUTHORIZED => format!(
                "Gmail access token is invalid or expired (status {status}). {detail}"
            )
            .trim_end()
            .to_string(),
            StatusCode::TOO_MANY_REQUESTS => {
                format!("Gmail API rate limit exceeded (status {status})")
            }
            _ if detail.is_empty() => format!("{context} failed with status {status}"),
            _ => format!("{context} failed with status {status}: {detail}"),
        }
    }
}

#[async_trait]
impl GmailClientTrait for GmailClient {
    async fn list_message_ids(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<String>,
    ) -> Result<(Vec<String>, Option<String>), String> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .http_client
            .get(self.messages_url())
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| format!("Failed to list messages: {e}"))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("List messages", response).await);
        }

        let body: ListMessagesResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse messages.list response: {e}"))?;

        let message_ids = body.messages.into_iter().map(|m| m.id).collect();
        Ok((message_ids, body.next_page_token))
    }

    async fn get_message(&self, message_id: &str) -> Result<RawMessage, String> {
        log::debug!("Fetching message: {message_id}");

        let response = self
            .http_client
            .get(format!("{}/{}", self.messages_url(), message_id))
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await
            .map_err(|e| format!("Failed to get message {message_id}: {e}"))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(&format!("Get message {message_id}"), response).await);
        }

        let message: RawMessage = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse message {message_id}: {e}"))?;

        log::debug!(
            "Message {} fetched: {} top-level part(s)",
            message.id,
            message.payload.parts.len()
        );

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_rejected() {
        // GmailClient はトークンを保持するため Debug を実装しない
        let Err(e) = GmailClient::new("   ") else {
            panic!("empty token should be rejected");
        };
        assert!(e.contains("access token is empty"));
    }

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let client =
            GmailClient::with_base_url("token", "http://localhost:1234/gmail/v1/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.messages_url(),
            "http://localhost:1234/gmail/v1/users/me/messages"
        );
    }

    #[test]
    fn test_list_response_without_messages() {
        let body: ListMessagesResponse = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(body.messages.is_empty());
        assert!(body.next_page_token.is_none());
    }
}
