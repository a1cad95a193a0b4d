//! 注文メールの取得
//!
//! 送信元ごとに1クエリずつ Gmail を検索し、ヒットしたメッセージを取得する。
//! クエリ単位で失敗を閉じ込め、1つのクエリが失敗しても残りのクエリは続行する。

use super::RawMessage;
use crate::gmail_client::GmailClientTrait;
use crate::logic::sync_logic::{build_search_query, SearchWindow, SenderQuery};
use crate::parsers::{extract_orders, OrderRecord};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

/// Gmail API の messages.list の1ページ上限
const MAX_PAGE_SIZE: u32 = 500;

/// 取得オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// 1クエリあたりの最大取得件数
    pub max_results_per_query: u32,
    /// メッセージ本文を並行取得する数
    pub concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_results_per_query: 500,
            concurrency: 4,
        }
    }
}

/// クエリにマッチするメッセージIDをページングしながらすべて取得する
///
/// max_total に達した時点で打ち切る。
pub async fn fetch_all_message_ids<C: GmailClientTrait + ?Sized>(
    client: &C,
    query: &str,
    max_total: usize,
) -> Result<Vec<String>, String> {
    let mut all_ids: Vec<String> = Vec::new();
    let mut page_token: Option<String> = None;
    let page_size = u32::try_from(max_total).unwrap_or(u32::MAX).clamp(1, MAX_PAGE_SIZE);

    loop {
        let (ids, next_token) = client
            .list_message_ids(query, page_size, page_token)
            .await?;

        if ids.is_empty() {
            break;
        }

        all_ids.extend(ids);

        if all_ids.len() >= max_total {
            all_ids.truncate(max_total);
            break;
        }

        match next_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(all_ids)
}

/// 送信元ごとに検索し、マッチした生メッセージをまとめて返す
///
/// # Arguments
/// * `client` - Gmail クライアント
/// * `senders` - 検索する送信元（1送信元 = 1クエリ）
/// * `window` - 検索期間
/// * `options` - 取得件数・並行数
///
/// # Returns
/// 取得できたメッセージ。失敗したクエリ・メッセージはログに出してスキップする
pub async fn fetch_order_emails<C: GmailClientTrait + ?Sized>(
    client: &C,
    senders: &[SenderQuery],
    window: &SearchWindow,
    options: &FetchOptions,
) -> Vec<RawMessage> {
    let mut all_messages: Vec<RawMessage> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for sender in senders {
        let query = build_search_query(sender, window);
        log::info!("Searching {} messages from {}", sender.platform, sender.address);

        let ids = match fetch_all_message_ids(client, &query, options.max_results_per_query as usize).await {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Search for {} failed, skipping: {e}", sender.address);
                continue;
            }
        };
        log::info!("Found {} message(s) from {}", ids.len(), sender.address);

        let new_ids: Vec<String> = ids.into_iter().filter(|id| seen_ids.insert(id.clone())).collect();

        let results: Vec<(String, Result<RawMessage, String>)> = stream::iter(new_ids)
            .map(|id| async move {
                let result = client.get_message(&id).await;
                (id, result)
            })
            .buffered(options.concurrency.max(1))
            .collect()
            .await;

        for (id, result) in results {
            match result {
                Ok(message) => all_messages.push(message),
                Err(e) => log::warn!("Failed to fetch message {id}: {e}"),
            }
        }
    }

    log::info!("Total messages fetched: {}", all_messages.len());
    all_messages
}

/// 取得 → 抽出までをまとめて行う
pub async fn fetch_orders<C: GmailClientTrait + ?Sized>(
    client: &C,
    senders: &[SenderQuery],
    window: &SearchWindow,
    options: &FetchOptions,
) -> Vec<OrderRecord> {
    let messages = fetch_order_emails(client, senders, window, options).await;
    extract_orders(&messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::{Header, MessageBody, MessagePart};
    use crate::gmail_client::MockGmailClientTrait;
    use crate::parsers::Platform;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::NaiveDate;

    fn window() -> SearchWindow {
        SearchWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        )
        .unwrap()
    }

    fn raw(id: &str, from: &str, text: &str) -> RawMessage {
        RawMessage {
            id: id.to_string(),
            internal_date: Some(1704067200000),
            payload: MessagePart {
                mime_type: Some("text/plain".to_string()),
                headers: vec![Header {
                    name: "From".to_string(),
                    value: from.to_string(),
                }],
                body: Some(MessageBody {
                    data: Some(URL_SAFE_NO_PAD.encode(text)),
                    size: None,
                }),
                parts: vec![],
            },
        }
    }

    #[tokio::test]
    async fn test_fetch_all_message_ids_pages() {
        let mut mock = MockGmailClientTrait::new();
        mock.expect_list_message_ids()
            .withf(|_, _, token| token.is_none())
            .returning(|_, _, _| Ok((vec!["a".to_string(), "b".to_string()], Some("p2".to_string()))));
        mock.expect_list_message_ids()
            .withf(|_, _, token| token.as_deref() == Some("p2"))
            .returning(|_, _, _| Ok((vec!["c".to_string()], None)));

        let ids = fetch_all_message_ids(&mock, "q", 500).await.unwrap();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fetch_all_message_ids_respects_max_total() {
        let mut mock = MockGmailClientTrait::new();
        mock.expect_list_message_ids()
            .withf(|_, page_size, _| *page_size == 2)
            .times(1)
            .returning(|_, _, _| {
                Ok((
                    vec!["a".to_string(), "b".to_string()],
                    Some("more".to_string()),
                ))
            });

        let ids = fetch_all_message_ids(&mock, "q", 2).await.unwrap();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failing_query_does_not_abort_batch() {
        let senders = vec![
            SenderQuery::new("noreply@swiggy.in", Platform::Swiggy),
            SenderQuery::new("no-reply@zomato.com", Platform::Zomato),
        ];
        let mut mock = MockGmailClientTrait::new();
        mock.expect_list_message_ids()
            .withf(|q, _, _| q.starts_with("from:noreply@swiggy.in"))
            .returning(|_, _, _| Err("Gmail API rate limit exceeded".to_string()));
        mock.expect_list_message_ids()
            .withf(|q, _, _| q.starts_with("from:no-reply@zomato.com"))
            .returning(|_, _, _| Ok((vec!["z1".to_string()], None)));
        mock.expect_get_message()
            .withf(|id| id == "z1")
            .returning(|id| Ok(raw(id, "no-reply@zomato.com", "Total: Rs. 300")));

        let messages =
            fetch_order_emails(&mock, &senders, &window(), &FetchOptions::default()).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "z1");
    }

    #[tokio::test]
    async fn test_failing_message_is_skipped() {
        let senders = vec![SenderQuery::new("orders@swiggy.in", Platform::Swiggy)];
        let mut mock = MockGmailClientTrait::new();
        mock.expect_list_message_ids()
            .returning(|_, _, _| Ok((vec!["ok".to_string(), "broken".to_string()], None)));
        mock.expect_get_message()
            .withf(|id| id == "ok")
            .returning(|id| Ok(raw(id, "orders@swiggy.in", "Total: Rs. 120")));
        mock.expect_get_message()
            .withf(|id| id == "broken")
            .returning(|_| Err("Failed to parse message broken".to_string()));

        let messages =
            fetch_order_emails(&mock, &senders, &window(), &FetchOptions::default()).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "ok");
    }

    #[tokio::test]
    async fn test_fetch_orders_extracts_records() {
        let senders = vec![SenderQuery::new("orders@swiggy.in", Platform::Swiggy)];
        let mut mock = MockGmailClientTrait::new();
        mock.expect_list_message_ids()
            .returning(|_, _, _| Ok((vec!["s1".to_string(), "s2".to_string()], None)));
        mock.expect_get_message()
            .withf(|id| id == "s1")
            .returning(|id| Ok(raw(id, "orders@swiggy.in", "Total: Rs. 120")));
        mock.expect_get_message()
            .withf(|id| id == "s2")
            .returning(|id| Ok(raw(id, "orders@swiggy.in", "Your delivery partner is nearby")));

        let orders = fetch_orders(&mock, &senders, &window(), &FetchOptions::default()).await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "s1");
        assert_eq!(orders[0].amount, 120.0);
        assert_eq!(orders[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
